//! File-backed substrate.
//!
//! Keeps one state file per stack:
//!
//! ```text
//! {state_dir}/
//! └── <stack_name>.json   # StackState: resources + exports
//! ```
//!
//! Declarations and exports are staged in memory and only written on
//! [`Substrate::commit`], using write-to-temp-then-rename so a crash never
//! leaves a half-written state file. A build that fails before commit leaves
//! the previous state untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::resource::{ResourceId, ResourceKind};
use crate::util::hash::{Hashable, ObjectHash};

use super::{Substrate, SubstrateError, resource_identifier};

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

impl Hashable for serde_json::Value {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
  Active,
  /// Replaced by a later build. Kept for reference, never edited.
  Superseded,
}

/// A resource as last declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
  pub kind: ResourceKind,
  pub logical_name: String,
  pub id: ResourceId,
  pub params_hash: ObjectHash,
  pub params: serde_json::Value,
  pub status: RecordStatus,
  /// Generation in which the record was last written.
  pub generation: u64,
}

/// Persisted state of one stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackState {
  pub version: u32,
  pub stack_name: String,
  /// Number of successful commits.
  pub generation: u64,
  pub resources: BTreeMap<String, ResourceRecord>,
  pub exports: BTreeMap<String, String>,
}

impl StackState {
  pub fn new(stack_name: &str) -> Self {
    Self {
      version: STATE_VERSION,
      stack_name: stack_name.to_string(),
      generation: 0,
      resources: BTreeMap::new(),
      exports: BTreeMap::new(),
    }
  }

  pub fn active(&self) -> impl Iterator<Item = &ResourceRecord> {
    self.resources.values().filter(|r| r.status == RecordStatus::Active)
  }

  /// Load a state file. Returns `Ok(None)` if it does not exist.
  pub fn load(path: &Path) -> Result<Option<Self>, SubstrateError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(SubstrateError::Read(e)),
    };

    let state: StackState = serde_json::from_str(&content).map_err(SubstrateError::Parse)?;
    if state.version != STATE_VERSION {
      return Err(SubstrateError::UnsupportedVersion(state.version));
    }
    Ok(Some(state))
  }

  /// Write atomically (temp file, then rename).
  fn save(&self, path: &Path) -> Result<(), SubstrateError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(SubstrateError::Write)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(self).map_err(SubstrateError::Serialize)?;
    fs::write(&temp_path, &content).map_err(SubstrateError::Write)?;
    fs::rename(&temp_path, path).map_err(SubstrateError::Write)?;
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Created,
  Updated,
  Unchanged,
  Superseded,
}

/// What a build did to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceChange {
  pub kind: ResourceKind,
  pub logical_name: String,
  pub id: ResourceId,
  pub change: ChangeKind,
}

/// Substrate persisting to a per-stack JSON state file.
#[derive(Debug)]
pub struct JournalSubstrate {
  path: PathBuf,
  region: String,
  account: String,
  previous: StackState,
  staged: BTreeMap<String, ResourceRecord>,
  staged_exports: BTreeMap<String, String>,
  changes: Vec<ResourceChange>,
}

impl JournalSubstrate {
  /// Open the journal for `stack_name` under `state_dir`.
  pub fn open(state_dir: &Path, stack_name: &str, region: &str, account: &str) -> Result<Self, SubstrateError> {
    let path = Self::state_path(state_dir, stack_name);
    let previous = StackState::load(&path)?.unwrap_or_else(|| StackState::new(stack_name));
    debug!(path = %path.display(), generation = previous.generation, "opened journal");

    Ok(Self {
      path,
      region: region.to_string(),
      account: account.to_string(),
      previous,
      staged: BTreeMap::new(),
      staged_exports: BTreeMap::new(),
      changes: Vec::new(),
    })
  }

  pub fn state_path(state_dir: &Path, stack_name: &str) -> PathBuf {
    state_dir.join(format!("{stack_name}.json"))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// State as of the last commit.
  pub fn state(&self) -> &StackState {
    &self.previous
  }

  /// Changes recorded by this build, in declaration order. Superseded
  /// entries are appended on commit.
  pub fn changes(&self) -> &[ResourceChange] {
    &self.changes
  }

  pub fn count(&self, change: ChangeKind) -> usize {
    self.changes.iter().filter(|c| c.change == change).count()
  }
}

fn record_key(kind: ResourceKind, logical_name: &str) -> String {
  format!("{kind}/{logical_name}")
}

impl Substrate for JournalSubstrate {
  fn declare(
    &mut self,
    kind: ResourceKind,
    logical_name: &str,
    params: &serde_json::Value,
  ) -> Result<ResourceId, SubstrateError> {
    let key = record_key(kind, logical_name);
    let params_hash = params.compute_hash().map_err(SubstrateError::Serialize)?;

    if let Some(staged) = self.staged.get(&key) {
      if staged.params_hash != params_hash {
        return Err(SubstrateError::NamingConflict {
          kind,
          name: logical_name.to_string(),
        });
      }
      return Ok(staged.id.clone());
    }

    let (id, change) = match self.previous.resources.get(&key) {
      None => (
        resource_identifier(&self.region, &self.account, kind, logical_name),
        ChangeKind::Created,
      ),
      Some(record) if record.status == RecordStatus::Superseded => (record.id.clone(), ChangeKind::Created),
      Some(record) if record.params_hash == params_hash => (record.id.clone(), ChangeKind::Unchanged),
      Some(record) => (record.id.clone(), ChangeKind::Updated),
    };

    self.staged.insert(
      key,
      ResourceRecord {
        kind,
        logical_name: logical_name.to_string(),
        id: id.clone(),
        params_hash,
        params: params.clone(),
        status: RecordStatus::Active,
        generation: self.previous.generation + 1,
      },
    );
    self.changes.push(ResourceChange {
      kind,
      logical_name: logical_name.to_string(),
      id: id.clone(),
      change,
    });

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
    let mut next = self.previous.clone();
    next.generation += 1;

    for (key, record) in next.resources.iter_mut() {
      if record.status == RecordStatus::Active && !self.staged.contains_key(key) {
        record.status = RecordStatus::Superseded;
        self.changes.push(ResourceChange {
          kind: record.kind,
          logical_name: record.logical_name.clone(),
          id: record.id.clone(),
          change: ChangeKind::Superseded,
        });
      }
    }

    // Records that did not change keep the generation they were written in.
    for (key, mut record) in std::mem::take(&mut self.staged) {
      if let Some(existing) = next.resources.get(&key)
        && existing.status == RecordStatus::Active
        && existing.params_hash == record.params_hash
      {
        record.generation = existing.generation;
      }
      next.resources.insert(key, record);
    }
    next.exports = std::mem::take(&mut self.staged_exports);

    next.save(&self.path)?;
    info!(
      path = %self.path.display(),
      generation = next.generation,
      "committed stack state"
    );
    self.previous = next;
    Ok(())
  }
}
