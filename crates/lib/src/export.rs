//! Values published for consumption outside the build.
//!
//! A companion stack deployed elsewhere (another region or account) cannot
//! reference this build's nodes directly, so the build publishes a fixed set
//! of plain strings instead. The composite `EdgeFunctionArnWithVersion` is
//! recomputed from the versioned reference of the current build every time,
//! so its two halves always come from the same build.

use serde::Serialize;
use tracing::info;

use crate::resource::{BucketRef, CertificateRef, DistributionRef, VersionedReference};
use crate::substrate::{Substrate, SubstrateError};

/// Export names, stable across releases.
pub mod names {
  pub const CERTIFICATE_ARN: &str = "CertificateArn";
  pub const EDGE_FUNCTION_ARN: &str = "EdgeFunctionArn";
  pub const BUCKET_NAME: &str = "BucketName";
  pub const DISTRIBUTION_ID: &str = "DistributionId";
  pub const EDGE_FUNCTION_ARN_WITH_VERSION: &str = "EdgeFunctionArnWithVersion";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedValue {
  pub name: String,
  pub value: String,
}

/// The ordered set of exports of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExportSet {
  values: Vec<ExportedValue>,
}

impl ExportSet {
  /// Collect the exports from the references of a finished graph.
  ///
  /// The function identifier is taken from the versioned reference itself,
  /// which is what keeps the plain and composite exports consistent.
  pub fn collect(
    certificate: &CertificateRef,
    version: &VersionedReference,
    bucket: &BucketRef,
    distribution: &DistributionRef,
  ) -> Self {
    let values = [
      (names::CERTIFICATE_ARN, certificate.id().to_string()),
      (names::EDGE_FUNCTION_ARN, version.function().id().to_string()),
      (names::BUCKET_NAME, bucket.bucket_name().to_string()),
      (names::DISTRIBUTION_ID, distribution.id().to_string()),
      (names::EDGE_FUNCTION_ARN_WITH_VERSION, version.qualified()),
    ]
    .into_iter()
    .map(|(name, value)| ExportedValue {
      name: name.to_string(),
      value,
    })
    .collect();

    Self { values }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.values.iter().find(|v| v.name == name).map(|v| v.value.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = &ExportedValue> {
    self.values.iter()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Publish every value, in order.
  pub fn publish(&self, substrate: &mut impl Substrate) -> Result<(), SubstrateError> {
    for export in &self.values {
      substrate.export(&export.name, &export.value)?;
      info!(name = %export.name, value = %export.value, "exported value");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::artifact::VersionTag;
  use crate::resource::{FunctionRef, ResourceId};
  use crate::substrate::InMemorySubstrate;
  use crate::util::hash::hash_bytes;

  fn id(s: &str) -> ResourceId {
    ResourceId(s.to_string())
  }

  fn exports(content: &[u8]) -> ExportSet {
    let function = FunctionRef::new(id("fn"), "rerouter");
    let tag = VersionTag::from_content_hash(&hash_bytes(content));
    let version = VersionedReference::new(function, tag, id("ver"));
    ExportSet::collect(
      &CertificateRef::new(id("cert")),
      &version,
      &BucketRef::new(id("bucket"), "example-site"),
      &DistributionRef::new(id("dist")),
    )
  }

  #[test]
  fn collects_fixed_names_in_order() {
    let set = exports(b"v1");
    let order: Vec<&str> = set.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
      order,
      vec![
        names::CERTIFICATE_ARN,
        names::EDGE_FUNCTION_ARN,
        names::BUCKET_NAME,
        names::DISTRIBUTION_ID,
        names::EDGE_FUNCTION_ARN_WITH_VERSION,
      ]
    );
    assert_eq!(set.get(names::BUCKET_NAME), Some("example-site"));
  }

  #[test]
  fn composite_is_function_and_tag() {
    let set = exports(b"v1");
    let composite = set.get(names::EDGE_FUNCTION_ARN_WITH_VERSION).unwrap();
    let (function, tag) = composite.rsplit_once(':').unwrap();
    assert_eq!(function, set.get(names::EDGE_FUNCTION_ARN).unwrap());
    assert_eq!(tag, VersionTag::from_content_hash(&hash_bytes(b"v1")).as_str());
  }

  #[test]
  fn publish_sends_every_value() {
    let set = exports(b"v1");
    let mut substrate = InMemorySubstrate::new("us-east-1", "123456789012");
    set.publish(&mut substrate).unwrap();
    substrate.commit().unwrap();

    assert_eq!(substrate.exports().len(), set.len());
    assert_eq!(substrate.exports()[names::DISTRIBUTION_ID], "dist");
  }
}
