use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::VERSION_TAG_PREFIX;
use crate::util::hash::{ContentHash, ContentReadError, hash_bytes, hash_directory, hash_file};

/// Entries skipped when hashing a directory artifact.
const DIRECTORY_EXCLUDES: &[&str] = &[".DS_Store", ".git"];

/// Where the bytes of an artifact come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
  /// Content held in memory.
  Inline(Vec<u8>),
  /// A single file or a directory tree on disk.
  Path(PathBuf),
}

/// A named unit of executable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployableArtifact {
  pub name: String,
  pub source: ArtifactSource,
}

/// Errors raised while reading artifact content or parsing tags.
#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("artifact '{name}' not found at {path}")]
  NotFound { name: String, path: String },

  #[error("failed to read artifact '{name}': {source}")]
  Read {
    name: String,
    #[source]
    source: ContentReadError,
  },

  #[error("invalid version tag '{0}': expected 'V' followed by 64 hex characters")]
  InvalidTag(String),
}

impl DeployableArtifact {
  pub fn inline(name: &str, content: impl Into<Vec<u8>>) -> Self {
    Self {
      name: name.to_string(),
      source: ArtifactSource::Inline(content.into()),
    }
  }

  pub fn from_path(name: &str, path: impl Into<PathBuf>) -> Self {
    Self {
      name: name.to_string(),
      source: ArtifactSource::Path(path.into()),
    }
  }

  /// Hash the artifact content.
  ///
  /// Files are hashed by content, directories with [`hash_directory`] so that
  /// timestamps and permissions never influence the result.
  pub fn content_hash(&self) -> Result<ContentHash, ArtifactError> {
    let path = match &self.source {
      ArtifactSource::Inline(bytes) => return Ok(hash_bytes(bytes)),
      ArtifactSource::Path(path) => path,
    };

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => ArtifactError::NotFound {
        name: self.name.clone(),
        path: path.display().to_string(),
      },
      _ => ArtifactError::Read {
        name: self.name.clone(),
        source: ContentReadError::Read {
          path: path.clone(),
          source: e,
        },
      },
    })?;

    let hashed = if metadata.is_dir() {
      hash_directory(path, DIRECTORY_EXCLUDES)
    } else {
      hash_file(path)
    };

    hashed.map_err(|source| ArtifactError::Read {
      name: self.name.clone(),
      source,
    })
  }
}

/// Content-derived version tag of an artifact.
///
/// Only constructible from a content hash or by parsing a well-formed tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
  pub fn from_content_hash(hash: &ContentHash) -> Self {
    Self(format!("{VERSION_TAG_PREFIX}{}", hash.0))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The content hash this tag was derived from.
  pub fn content_hash(&self) -> ContentHash {
    ContentHash(self.0[VERSION_TAG_PREFIX.len_utf8()..].to_string())
  }
}

impl fmt::Display for VersionTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for VersionTag {
  type Err = ArtifactError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let hex = s
      .strip_prefix(VERSION_TAG_PREFIX)
      .ok_or_else(|| ArtifactError::InvalidTag(s.to_string()))?;
    let well_formed = hex.len() == 64 && hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !well_formed {
      return Err(ArtifactError::InvalidTag(s.to_string()));
    }
    Ok(Self(s.to_string()))
  }
}

impl TryFrom<String> for VersionTag {
  type Error = ArtifactError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<VersionTag> for String {
  fn from(tag: VersionTag) -> Self {
    tag.0
  }
}

/// Derive the version tag for an artifact from its content.
///
/// Pure function of the bytes: no timestamps, no randomness.
///
/// # Errors
///
/// Returns an error if the content cannot be read.
pub fn derive_version_tag(artifact: &DeployableArtifact) -> Result<VersionTag, ArtifactError> {
  let hash = artifact.content_hash()?;
  let tag = VersionTag::from_content_hash(&hash);
  debug!(artifact = %artifact.name, tag = %tag, "derived version tag");
  Ok(tag)
}

/// Whether `value` can be used as an identifier fragment on the substrate.
pub fn is_identifier_safe(value: &str) -> bool {
  value.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) && value.chars().all(|c| c.is_ascii_alphanumeric())
}
