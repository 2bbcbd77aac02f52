use std::collections::BTreeMap;

use tracing::debug;

use crate::resource::{ResourceId, ResourceKind};

use super::{Substrate, SubstrateError, resource_identifier};

/// A substrate that keeps everything in memory.
///
/// Every call is recorded in order so that tests can inspect exactly what the
/// builder asked for. Declarations and exports are staged per build and only
/// replace the committed set on [`Substrate::commit`], so one instance can
/// serve successive builds the way a journal does.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubstrate {
  region: String,
  account: String,
  declarations: BTreeMap<(ResourceKind, String), (ResourceId, serde_json::Value)>,
  staged: BTreeMap<(ResourceKind, String), (ResourceId, serde_json::Value)>,
  calls: Vec<(ResourceKind, String)>,
  exports: BTreeMap<String, String>,
  staged_exports: BTreeMap<String, String>,
  rejections: BTreeMap<ResourceKind, String>,
  committed: bool,
}

impl InMemorySubstrate {
  pub fn new(region: &str, account: &str) -> Self {
    Self {
      region: region.to_string(),
      account: account.to_string(),
      ..Default::default()
    }
  }

  /// Make every declaration of `kind` fail with `reason`.
  pub fn reject(mut self, kind: ResourceKind, reason: &str) -> Self {
    self.rejections.insert(kind, reason.to_string());
    self
  }

  /// Every declare call in order, including repeats.
  pub fn calls(&self) -> &[(ResourceKind, String)] {
    &self.calls
  }

  /// Params of the latest declaration, staged or committed.
  pub fn params(&self, kind: ResourceKind, logical_name: &str) -> Option<&serde_json::Value> {
    let key = (kind, logical_name.to_string());
    self
      .staged
      .get(&key)
      .or_else(|| self.declarations.get(&key))
      .map(|(_, params)| params)
  }

  /// Distinct resources known to this substrate, staged or committed.
  pub fn resource_count(&self) -> usize {
    self
      .declarations
      .keys()
      .chain(self.staged.keys().filter(|key| !self.declarations.contains_key(*key)))
      .count()
  }

  /// Exports of the last committed build.
  pub fn exports(&self) -> &BTreeMap<String, String> {
    &self.exports
  }

  pub fn is_committed(&self) -> bool {
    self.committed
  }
}

impl Substrate for InMemorySubstrate {
  fn declare(
    &mut self,
    kind: ResourceKind,
    logical_name: &str,
    params: &serde_json::Value,
  ) -> Result<ResourceId, SubstrateError> {
    self.calls.push((kind, logical_name.to_string()));

    if let Some(reason) = self.rejections.get(&kind) {
      return Err(SubstrateError::Rejected {
        kind,
        name: logical_name.to_string(),
        reason: reason.clone(),
      });
    }

    let key = (kind, logical_name.to_string());
    if let Some((id, existing)) = self.staged.get(&key) {
      if existing != params {
        return Err(SubstrateError::NamingConflict {
          kind,
          name: logical_name.to_string(),
        });
      }
      return Ok(id.clone());
    }

    let id = match self.declarations.get(&key) {
      Some((id, _)) => id.clone(),
      None => resource_identifier(&self.region, &self.account, kind, logical_name),
    };
    debug!(kind = %kind, name = logical_name, id = %id, "recorded declaration");
    self.staged.insert(key, (id.clone(), params.clone()));
    Ok(id)
  }

  fn export(&mut self, name: &str, value: &str) -> Result<(), SubstrateError> {
    if self.staged_exports.contains_key(name) {
      return Err(SubstrateError::DuplicateExport(name.to_string()));
    }
    self.staged_exports.insert(name.to_string(), value.to_string());
    Ok(())
  }

  fn commit(&mut self) -> Result<(), SubstrateError> {
    self.declarations.append(&mut self.staged);
    self.exports = std::mem::take(&mut self.staged_exports);
    self.committed = true;
    Ok(())
  }
}
