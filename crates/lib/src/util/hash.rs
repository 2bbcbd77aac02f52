//! Hashing utilities for content addressing.
//!
//! - [`ObjectHash`]: truncated digest of a serializable value, used as a
//!   fingerprint for resource parameters and build results
//! - [`ContentHash`]: full digest of deployable content
//! - [`hash_bytes`], [`hash_file`], [`hash_directory`]: produce a `ContentHash`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// Truncated SHA-256 of the JSON serialization of a value.
///
/// Lowercase hex, [`OBJ_HASH_PREFIX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Values that can be fingerprinted.
pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_vec(self)?;
    let mut digest = hash_bytes(&serialized).0;
    digest.truncate(OBJ_HASH_PREFIX_LEN);
    Ok(ObjectHash(digest))
  }
}

/// Full 64-character lowercase hex SHA-256 of artifact content.
///
/// Never truncated: it feeds the version tag of edge functions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Error)]
pub enum ContentReadError {
  #[error("failed to walk {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read symlink {path}: {source}")]
  Symlink {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}

/// Stream a file through SHA-256.
pub fn hash_file(path: &Path) -> Result<ContentHash, ContentReadError> {
  let read_err = |source| ContentReadError::Read {
    path: path.to_path_buf(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).map_err(read_err)?;
  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Deterministic hash of a directory tree.
///
/// Covers relative paths, file contents and symlink targets. Timestamps and
/// permissions are ignored. Entries whose file name is in `exclude` are
/// skipped together with everything below them.
pub fn hash_directory(root: &Path, exclude: &[&str]) -> Result<ContentHash, ContentReadError> {
  let walker = WalkDir::new(root)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.file_name().to_str().is_none_or(|name| !exclude.contains(&name)));

  let mut lines = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|source| ContentReadError::Walk {
      path: root.to_path_buf(),
      source,
    })?;
    if let Some(line) = manifest_line(root, entry.path(), entry.file_type())? {
      lines.push(line);
    }
  }
  lines.sort();

  let mut hasher = Sha256::new();
  for line in &lines {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }
  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// One line of the directory manifest: entry type, quoted relative path and,
/// for files and symlinks, a digest.
fn manifest_line(root: &Path, path: &Path, file_type: fs::FileType) -> Result<Option<String>, ContentReadError> {
  // Separators are normalized so the hash is stable across platforms.
  let relative = path
    .strip_prefix(root)
    .unwrap_or(path)
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/");

  let line = if file_type.is_symlink() {
    let target = fs::read_link(path).map_err(|source| ContentReadError::Symlink {
      path: path.to_path_buf(),
      source,
    })?;
    format!("link {relative:?} {}", hash_bytes(target.to_string_lossy().as_bytes()))
  } else if file_type.is_file() {
    format!("file {relative:?} {}", hash_file(path)?)
  } else if file_type.is_dir() {
    format!("dir {relative:?}")
  } else {
    return Ok(None);
  };
  Ok(Some(line))
}
