//! Top-level build errors.

use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::config::ConfigError;
use crate::graph::DependencyOrderError;
use crate::routing::RoutingError;
use crate::substrate::SubstrateError;

/// Why a build aborted. There is no partial success: any of these means no
/// result was produced and nothing was committed.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Missing or invalid input, including unreadable artifact content.
  #[error("configuration error: {0}")]
  Configuration(#[from] ConfigError),

  /// A node referenced something not yet declared. Indicates a bug in the
  /// caller, never a transient condition.
  #[error("dependency order violation: {0}")]
  DependencyOrder(#[from] DependencyOrderError),

  /// The substrate refused a declaration or export.
  #[error(transparent)]
  Substrate(#[from] SubstrateError),

  #[error("routing error: {0}")]
  Routing(#[from] RoutingError),

  #[error("failed to serialize resource parameters: {0}")]
  Serialize(#[from] serde_json::Error),
}

impl From<ArtifactError> for BuildError {
  fn from(err: ArtifactError) -> Self {
    BuildError::Configuration(ConfigError::Artifact(err))
  }
}
