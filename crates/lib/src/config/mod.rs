//! Stack configuration.
//!
//! Configuration is constant for the duration of a build and is loaded from
//! either a Lua file (evaluated, must `return` a table) or a TOML file:
//!
//! ```lua
//! return {
//!   stack_name = "site-global",
//!   domain_name = "www.example.com",
//!   api_domain_name = "api.example.com",
//!   reserved_static_prefixes = { "_nuxt/" },
//!   artifact = {
//!     path = "dist/edge-lambdas",
//!     handler = "rerouter.handler",
//!     timeout = edgestack.env("EDGE_TIMEOUT", "3s"),
//!   },
//!   bucket = { name = "example-site" },
//! }
//! ```
//!
//! Relative artifact paths resolve against the directory of the config file.
//! [`StackConfig::validate`] runs before anything is declared.

mod lua;
mod types;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::artifact::ArtifactError;
use crate::routing::RoutingError;

pub use types::*;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("lua error in {path}: {message}")]
  Lua { path: String, message: String },

  #[error("failed to parse {path}: {message}")]
  Parse { path: String, message: String },

  #[error("unsupported config format '{0}': expected a .lua or .toml file")]
  UnsupportedFormat(String),

  #[error("invalid {field} '{value}': {reason}")]
  InvalidField {
    field: &'static str,
    value: String,
    reason: String,
  },

  #[error("edge functions must be deployed to {expected}, got '{actual}'")]
  EdgeRegion { expected: String, actual: String },

  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error(transparent)]
  Routing(#[from] RoutingError),
}

/// Load a stack configuration from a `.lua` or `.toml` file.
///
/// The result is not validated; call [`StackConfig::validate`] (the graph
/// builder does) before using it.
pub fn load_config(path: &Path) -> Result<StackConfig, ConfigError> {
  let shown = path.display().to_string();
  let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: shown.clone(),
    source,
  })?;

  let config_dir = path.parent().unwrap_or(Path::new(""));

  let mut config = match path.extension().and_then(|e| e.to_str()) {
    Some("lua") => lua::evaluate(&content, &shown, config_dir)?,
    Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::Parse {
      path: shown.clone(),
      message: e.to_string(),
    })?,
    _ => return Err(ConfigError::UnsupportedFormat(shown)),
  };

  config.resolve_paths(config_dir);
  info!(stack = %config.stack_name, path = %shown, "loaded config");
  Ok(config)
}
