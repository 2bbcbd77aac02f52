use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::artifact::DeployableArtifact;
use crate::consts::{DEFAULT_API_PATH_PATTERN, EDGE_REGION, MAX_EDGE_TIMEOUT_SECS};
use crate::resource::{RemovalPolicy, SecurityPolicy};
use crate::routing::{PathPattern, check_reserved_prefixes};

use super::ConfigError;

/// Everything a build needs to know, fixed for the duration of the build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
  pub stack_name: String,
  /// Public domain served by the distribution and covered by the certificate.
  pub domain_name: String,
  /// Domain of the API origin receiving `api_path_pattern` traffic.
  pub api_domain_name: String,
  #[serde(default = "default_region")]
  pub region: String,
  #[serde(default = "default_account")]
  pub account: String,
  #[serde(default)]
  pub security_policy: SecurityPolicy,
  #[serde(default = "default_api_path_pattern")]
  pub api_path_pattern: String,
  /// Path prefixes owned by the static application, e.g. `_nuxt/`.
  #[serde(default)]
  pub reserved_static_prefixes: Vec<String>,
  pub artifact: ArtifactConfig,
  pub bucket: BucketConfig,
}

/// The edge function and its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactConfig {
  #[serde(default = "default_artifact_name")]
  pub name: String,
  /// File or directory holding the function code.
  pub path: PathBuf,
  /// Entry point in `file.export` form.
  pub handler: String,
  #[serde(default = "default_runtime")]
  pub runtime: String,
  /// Human readable duration, e.g. `3s`.
  #[serde(default = "default_timeout")]
  pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
  pub name: String,
  #[serde(default = "default_index_document")]
  pub index_document: String,
  #[serde(default = "default_error_document")]
  pub error_document: String,
  #[serde(default)]
  pub removal_policy: RemovalPolicy,
}

fn default_region() -> String {
  EDGE_REGION.to_string()
}

fn default_account() -> String {
  "000000000000".to_string()
}

fn default_api_path_pattern() -> String {
  DEFAULT_API_PATH_PATTERN.to_string()
}

fn default_artifact_name() -> String {
  "edge-rerouter".to_string()
}

fn default_runtime() -> String {
  "nodejs18.x".to_string()
}

fn default_timeout() -> String {
  "3s".to_string()
}

fn default_index_document() -> String {
  "index.html".to_string()
}

fn default_error_document() -> String {
  "200.html".to_string()
}

impl StackConfig {
  /// Check every field before anything is declared.
  ///
  /// # Errors
  ///
  /// Returns the first invalid field found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_stack_name(&self.stack_name)?;
    validate_domain("domain_name", &self.domain_name)?;
    validate_domain("api_domain_name", &self.api_domain_name)?;

    if self.region != EDGE_REGION {
      return Err(ConfigError::EdgeRegion {
        expected: EDGE_REGION.to_string(),
        actual: self.region.clone(),
      });
    }

    if self.account.len() != 12 || !self.account.chars().all(|c| c.is_ascii_digit()) {
      return Err(invalid("account", &self.account, "expected 12 digits"));
    }

    validate_name("artifact.name", &self.artifact.name)?;
    validate_handler(&self.artifact.handler)?;
    validate_runtime(&self.artifact.runtime)?;
    self.timeout()?;

    validate_bucket_name(&self.bucket.name)?;
    for (field, document) in [
      ("bucket.index_document", &self.bucket.index_document),
      ("bucket.error_document", &self.bucket.error_document),
    ] {
      if document.is_empty() || document.starts_with('/') {
        return Err(invalid(field, document, "expected a relative object key"));
      }
    }

    let api_pattern = self.api_pattern()?;
    check_reserved_prefixes(&api_pattern, &self.reserved_static_prefixes)?;

    Ok(())
  }

  /// The function timeout.
  ///
  /// Must be a whole number of seconds between 1 and the origin-request
  /// limit.
  pub fn timeout(&self) -> Result<Duration, ConfigError> {
    let raw = &self.artifact.timeout;
    let timeout = humantime::parse_duration(raw).map_err(|e| invalid("artifact.timeout", raw, &e.to_string()))?;

    if timeout.subsec_nanos() != 0 {
      return Err(invalid("artifact.timeout", raw, "must be a whole number of seconds"));
    }
    if timeout.as_secs() == 0 || timeout.as_secs() > MAX_EDGE_TIMEOUT_SECS {
      return Err(invalid(
        "artifact.timeout",
        raw,
        &format!("must be between 1s and {MAX_EDGE_TIMEOUT_SECS}s"),
      ));
    }
    Ok(timeout)
  }

  pub fn api_pattern(&self) -> Result<PathPattern, ConfigError> {
    Ok(self.api_path_pattern.parse()?)
  }

  /// The artifact described by this config.
  pub fn artifact(&self) -> DeployableArtifact {
    DeployableArtifact::from_path(&self.artifact.name, &self.artifact.path)
  }

  /// Resolve relative paths against `base`.
  pub fn resolve_paths(&mut self, base: &Path) {
    if self.artifact.path.is_relative() {
      let joined = base.join(&self.artifact.path);
      self.artifact.path = dunce::canonicalize(&joined).unwrap_or(joined);
    }
  }
}

fn invalid(field: &'static str, value: &str, reason: &str) -> ConfigError {
  ConfigError::InvalidField {
    field,
    value: value.to_string(),
    reason: reason.to_string(),
  }
}

/// Check a stack name on its own, e.g. before using it to locate state.
pub fn validate_stack_name(value: &str) -> Result<(), ConfigError> {
  validate_name("stack_name", value)
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
  let starts_with_letter = value.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
  if !starts_with_letter || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
    return Err(invalid(
      field,
      value,
      "expected a letter followed by letters, digits, '-' or '_'",
    ));
  }
  Ok(())
}

/// RFC 1123 host name with at least two labels.
fn validate_domain(field: &'static str, value: &str) -> Result<(), ConfigError> {
  if value.is_empty() || value.len() > 253 {
    return Err(invalid(field, value, "length must be between 1 and 253"));
  }

  let labels: Vec<&str> = value.split('.').collect();
  if labels.len() < 2 {
    return Err(invalid(field, value, "expected a fully qualified domain name"));
  }

  for label in labels {
    if label.is_empty() || label.len() > 63 {
      return Err(invalid(field, value, "each label must be 1 to 63 characters"));
    }
    if label.starts_with('-') || label.ends_with('-') {
      return Err(invalid(field, value, "labels cannot start or end with '-'"));
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
      return Err(invalid(field, value, "labels may only contain letters, digits and '-'"));
    }
  }
  Ok(())
}

fn validate_bucket_name(value: &str) -> Result<(), ConfigError> {
  let field = "bucket.name";
  if value.len() < 3 || value.len() > 63 {
    return Err(invalid(field, value, "length must be between 3 and 63"));
  }
  if !value
    .chars()
    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
  {
    return Err(invalid(field, value, "only lowercase letters, digits, '-' and '.' are allowed"));
  }
  let edges_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
  if !edges_ok(value.chars().next()) || !edges_ok(value.chars().last()) {
    return Err(invalid(field, value, "must start and end with a letter or digit"));
  }
  if value.contains("..") {
    return Err(invalid(field, value, "consecutive dots are not allowed"));
  }
  Ok(())
}

fn validate_handler(value: &str) -> Result<(), ConfigError> {
  match value.rsplit_once('.') {
    Some((file, export)) if !file.is_empty() && !export.is_empty() && !value.contains(char::is_whitespace) => Ok(()),
    _ => Err(invalid("artifact.handler", value, "expected 'file.export'")),
  }
}

fn validate_runtime(value: &str) -> Result<(), ConfigError> {
  let starts_with_letter = value.chars().next().is_some_and(|c| c.is_ascii_lowercase());
  if !starts_with_letter
    || !value
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.')
  {
    return Err(invalid("artifact.runtime", value, "expected a runtime identifier like 'nodejs18.x'"));
  }
  Ok(())
}
