//! The provisioning substrate consumed by the graph builder.
//!
//! The builder never provisions anything itself. It hands each resource to a
//! [`Substrate`], which turns a `(kind, logical name, params)` declaration
//! into an opaque, stable identifier, and publishes exported values. The
//! substrate is also the unit of atomicity: the builder calls
//! [`Substrate::commit`] as its very last step, and a substrate must not make
//! any declaration durable before then.
//!
//! # Implementations
//!
//! - [`InMemorySubstrate`]: records calls in memory, used by `synth` and tests
//! - [`JournalSubstrate`]: persists a per-stack state file and reports what
//!   changed between builds

mod journal;
mod memory;

use thiserror::Error;

use crate::consts::ID_SCHEME;
use crate::resource::{ResourceId, ResourceKind};

pub use journal::{
  ChangeKind, JournalSubstrate, RecordStatus, ResourceChange, ResourceRecord, STATE_VERSION, StackState,
};
pub use memory::InMemorySubstrate;

/// Errors reported by a substrate. Surfaced to the caller verbatim.
#[derive(Debug, Error)]
pub enum SubstrateError {
  #[error("substrate rejected {kind} '{name}': {reason}")]
  Rejected {
    kind: ResourceKind,
    name: String,
    reason: String,
  },

  #[error("{kind} '{name}' was already declared with different parameters")]
  NamingConflict { kind: ResourceKind, name: String },

  #[error("export '{0}' was already published")]
  DuplicateExport(String),

  #[error("failed to read state file: {0}")]
  Read(#[source] std::io::Error),

  #[error("failed to write state file: {0}")]
  Write(#[source] std::io::Error),

  #[error("failed to parse state file: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported state file version: {0}")]
  UnsupportedVersion(u32),
}

/// A backend that turns declarations into identifiers.
pub trait Substrate {
  /// Declare a resource and return its identifier.
  ///
  /// Must be idempotent: declaring the same resource with unchanged params
  /// returns the same identifier and creates nothing new.
  fn declare(
    &mut self,
    kind: ResourceKind,
    logical_name: &str,
    params: &serde_json::Value,
  ) -> Result<ResourceId, SubstrateError>;

  /// Publish a named plain-string value for consumers outside this build.
  fn export(&mut self, name: &str, value: &str) -> Result<(), SubstrateError>;

  /// Make every declaration and export of this build durable.
  fn commit(&mut self) -> Result<(), SubstrateError> {
    Ok(())
  }
}

/// The identifier both local substrates assign to a resource.
///
/// Depends only on where and what the resource is, never on its params, so
/// updating a resource keeps its identifier.
pub fn resource_identifier(region: &str, account: &str, kind: ResourceKind, logical_name: &str) -> ResourceId {
  ResourceId(format!("{ID_SCHEME}:{region}:{account}:{kind}/{logical_name}"))
}
