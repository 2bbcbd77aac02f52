//! Distribution routing rules.
//!
//! A distribution dispatches each request path to exactly one origin. The
//! routing table holds one catch-all default rule plus any number of
//! pattern-matched rules, and is validated on construction:
//!
//! - exactly one rule is the default, and it carries no pattern
//! - every other rule has a pattern
//! - no two patterns can match the same path
//!
//! Because patterns never overlap, at most one non-default rule matches any
//! path, so dispatch is unambiguous: the matching rule wins, otherwise the
//! default does.
//!
//! # Pattern Syntax
//!
//! A literal path prefix optionally followed by a single trailing `*`:
//!
//! - `api/*` matches `api/` and everything below it
//! - `robots.txt` matches exactly `robots.txt`
//!
//! A leading `/` is ignored. A bare `*` is reserved for the default rule.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::resource::{BucketRef, ResourceId, VersionedReference};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
  #[error("routing table has no default rule")]
  NoDefault,

  #[error("routing table has {0} default rules, expected exactly one")]
  MultipleDefaults(usize),

  #[error("default rule must not have a path pattern, found '{0}'")]
  DefaultHasPattern(String),

  #[error("rule {0} is not the default but has no path pattern")]
  MissingPattern(usize),

  #[error("invalid path pattern '{pattern}': {reason}")]
  InvalidPattern { pattern: String, reason: String },

  #[error("path patterns '{first}' and '{second}' overlap")]
  Overlap { first: String, second: String },

  #[error("path pattern '{pattern}' collides with reserved static prefix '{reserved}'")]
  ReservedPrefix { pattern: String, reserved: String },
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct PathPattern {
  prefix: String,
  wildcard: bool,
}

impl PathPattern {
  pub fn matches(&self, path: &str) -> bool {
    let path = path.trim_start_matches('/');
    if self.wildcard {
      path.starts_with(&self.prefix)
    } else {
      path == self.prefix
    }
  }

  /// Whether some path is matched by both patterns.
  pub fn overlaps(&self, other: &PathPattern) -> bool {
    match (self.wildcard, other.wildcard) {
      (true, true) => self.prefix.starts_with(&other.prefix) || other.prefix.starts_with(&self.prefix),
      (true, false) => other.prefix.starts_with(&self.prefix),
      (false, true) => self.prefix.starts_with(&other.prefix),
      (false, false) => self.prefix == other.prefix,
    }
  }

  /// Parse a reserved static prefix such as `_nuxt/` or `_nuxt/*`.
  ///
  /// A bare prefix without `*` reserves everything below it.
  pub fn reserved(prefix: &str) -> Result<Self, RoutingError> {
    if prefix.ends_with('*') {
      prefix.parse()
    } else {
      format!("{prefix}*").parse()
    }
  }
}

impl fmt::Display for PathPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.wildcard {
      write!(f, "{}*", self.prefix)
    } else {
      f.write_str(&self.prefix)
    }
  }
}

impl From<PathPattern> for String {
  fn from(pattern: PathPattern) -> Self {
    pattern.to_string()
  }
}

impl FromStr for PathPattern {
  type Err = RoutingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = |reason: &str| RoutingError::InvalidPattern {
      pattern: s.to_string(),
      reason: reason.to_string(),
    };

    let trimmed = s.trim_start_matches('/');
    let (prefix, wildcard) = match trimmed.strip_suffix('*') {
      Some(prefix) => (prefix, true),
      None => (trimmed, false),
    };

    if prefix.is_empty() {
      return Err(invalid("catch-all patterns are reserved for the default rule"));
    }
    if prefix.contains('*') || prefix.contains('?') {
      return Err(invalid("only a single trailing '*' is supported"));
    }
    if prefix.chars().any(char::is_whitespace) {
      return Err(invalid("whitespace is not allowed"));
    }

    Ok(Self {
      prefix: prefix.to_string(),
      wildcard,
    })
  }
}

/// Where matched requests are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Origin {
  /// The private content bucket.
  Bucket { bucket: BucketRef },
  /// An external HTTPS endpoint, e.g. the API gateway domain.
  Custom { domain_name: String },
}

/// Phase of request processing at which an edge function runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeEventType {
  ViewerRequest,
  OriginRequest,
  OriginResponse,
  ViewerResponse,
}

/// A versioned edge function attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeAssociation {
  pub event_type: EdgeEventType,
  pub function: VersionedReference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllowedMethods {
  #[default]
  GetHead,
  GetHeadOptions,
  All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingRule {
  pub pattern: Option<PathPattern>,
  pub origin: Origin,
  pub edge_associations: Vec<EdgeAssociation>,
  pub allowed_methods: AllowedMethods,
  pub is_default: bool,
}

impl RoutingRule {
  /// The catch-all rule.
  pub fn default_rule(origin: Origin) -> Self {
    Self {
      pattern: None,
      origin,
      edge_associations: Vec::new(),
      allowed_methods: AllowedMethods::default(),
      is_default: true,
    }
  }

  pub fn with_pattern(pattern: PathPattern, origin: Origin) -> Self {
    Self {
      pattern: Some(pattern),
      origin,
      edge_associations: Vec::new(),
      allowed_methods: AllowedMethods::default(),
      is_default: false,
    }
  }

  pub fn with_edge_function(mut self, event_type: EdgeEventType, function: VersionedReference) -> Self {
    self.edge_associations.push(EdgeAssociation { event_type, function });
    self
  }

  pub fn with_allowed_methods(mut self, methods: AllowedMethods) -> Self {
    self.allowed_methods = methods;
    self
  }

  fn pattern_label(&self) -> String {
    self
      .pattern
      .as_ref()
      .map(ToString::to_string)
      .unwrap_or_else(|| "*".to_string())
  }
}

/// A validated set of routing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutingTable {
  rules: Vec<RoutingRule>,
}

impl RoutingTable {
  /// Validate and wrap a set of rules.
  ///
  /// # Errors
  ///
  /// Returns an error unless exactly one rule is the default and the
  /// patterns of all other rules are pairwise disjoint.
  pub fn new(rules: Vec<RoutingRule>) -> Result<Self, RoutingError> {
    let defaults: Vec<&RoutingRule> = rules.iter().filter(|r| r.is_default).collect();
    match defaults.as_slice() {
      [] => return Err(RoutingError::NoDefault),
      [default] => {
        if let Some(pattern) = &default.pattern {
          return Err(RoutingError::DefaultHasPattern(pattern.to_string()));
        }
      }
      many => return Err(RoutingError::MultipleDefaults(many.len())),
    }

    let mut patterns: Vec<&PathPattern> = Vec::new();
    for (index, rule) in rules.iter().enumerate().filter(|(_, r)| !r.is_default) {
      let pattern = rule.pattern.as_ref().ok_or(RoutingError::MissingPattern(index))?;
      if let Some(existing) = patterns.iter().find(|p| p.overlaps(pattern)) {
        return Err(RoutingError::Overlap {
          first: existing.to_string(),
          second: pattern.to_string(),
        });
      }
      patterns.push(pattern);
    }

    Ok(Self { rules })
  }

  pub fn rules(&self) -> &[RoutingRule] {
    &self.rules
  }

  pub fn default_rule(&self) -> &RoutingRule {
    // `new` guarantees exactly one default rule.
    self
      .rules
      .iter()
      .find(|r| r.is_default)
      .unwrap_or(&self.rules[0])
  }

  /// The rule that handles `path`.
  pub fn dispatch(&self, path: &str) -> &RoutingRule {
    self
      .rules
      .iter()
      .filter(|r| !r.is_default)
      .find(|r| r.pattern.as_ref().is_some_and(|p| p.matches(path)))
      .unwrap_or_else(|| self.default_rule())
  }

  /// Identifiers of every resource the rules point at.
  pub fn dependencies(&self) -> Vec<ResourceId> {
    let mut deps = Vec::new();
    for rule in &self.rules {
      if let Origin::Bucket { bucket } = &rule.origin {
        deps.push(bucket.id().clone());
      }
      for association in &rule.edge_associations {
        deps.push(association.function.id().clone());
      }
    }
    deps
  }

  pub fn describe(&self) -> Vec<String> {
    self.rules.iter().map(RoutingRule::pattern_label).collect()
  }
}

/// Ensure `pattern` does not capture any reserved static asset prefix.
pub fn check_reserved_prefixes(pattern: &PathPattern, reserved: &[String]) -> Result<(), RoutingError> {
  for prefix in reserved {
    if PathPattern::reserved(prefix)?.overlaps(pattern) {
      return Err(RoutingError::ReservedPrefix {
        pattern: pattern.to_string(),
        reserved: prefix.clone(),
      });
    }
  }
  Ok(())
}
