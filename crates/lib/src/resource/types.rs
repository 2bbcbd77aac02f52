use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::VersionTag;
use crate::consts::{BASIC_EXECUTION_POLICY, EXPORT_DELIMITER, TRUSTED_PRINCIPALS};
use crate::routing::RoutingTable;
use crate::util::hash::ContentHash;

/// The kinds of resource this stack declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  Certificate,
  ExecutionRole,
  Function,
  FunctionVersion,
  Bucket,
  Distribution,
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKind::Certificate => "certificate",
      ResourceKind::ExecutionRole => "execution_role",
      ResourceKind::Function => "function",
      ResourceKind::FunctionVersion => "function_version",
      ResourceKind::Bucket => "bucket",
      ResourceKind::Distribution => "distribution",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Opaque identifier handed back by the substrate for a declared resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A declared TLS certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRef {
  id: ResourceId,
}

impl CertificateRef {
  pub(crate) fn new(id: ResourceId) -> Self {
    Self { id }
  }

  pub fn id(&self) -> &ResourceId {
    &self.id
  }
}

/// A declared execution role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRef {
  id: ResourceId,
}

impl RoleRef {
  pub(crate) fn new(id: ResourceId) -> Self {
    Self { id }
  }

  pub fn id(&self) -> &ResourceId {
    &self.id
  }
}

/// A declared compute function (its unversioned identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRef {
  id: ResourceId,
  logical_name: String,
}

impl FunctionRef {
  pub(crate) fn new(id: ResourceId, logical_name: &str) -> Self {
    Self {
      id,
      logical_name: logical_name.to_string(),
    }
  }

  pub fn id(&self) -> &ResourceId {
    &self.id
  }

  pub fn logical_name(&self) -> &str {
    &self.logical_name
  }
}

/// A declared content bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRef {
  id: ResourceId,
  bucket_name: String,
}

impl BucketRef {
  pub(crate) fn new(id: ResourceId, bucket_name: &str) -> Self {
    Self {
      id,
      bucket_name: bucket_name.to_string(),
    }
  }

  pub fn id(&self) -> &ResourceId {
    &self.id
  }

  pub fn bucket_name(&self) -> &str {
    &self.bucket_name
  }
}

/// A declared distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRef {
  id: ResourceId,
}

impl DistributionRef {
  pub(crate) fn new(id: ResourceId) -> Self {
    Self { id }
  }

  pub fn id(&self) -> &ResourceId {
    &self.id
  }
}

/// A function pinned to one content-derived version.
///
/// Immutable: a content change yields a new `VersionedReference` with a new
/// version node behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedReference {
  function: FunctionRef,
  tag: VersionTag,
  id: ResourceId,
}

impl VersionedReference {
  pub(crate) fn new(function: FunctionRef, tag: VersionTag, id: ResourceId) -> Self {
    Self { function, tag, id }
  }

  pub fn function(&self) -> &FunctionRef {
    &self.function
  }

  pub fn tag(&self) -> &VersionTag {
    &self.tag
  }

  /// Identifier of the version node itself.
  pub fn id(&self) -> &ResourceId {
    &self.id
  }

  /// `<function id>:<version tag>`, the form consumed across stacks.
  pub fn qualified(&self) -> String {
    format!("{}{}{}", self.function.id, EXPORT_DELIMITER, self.tag)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMethod {
  #[default]
  #[serde(rename = "DNS")]
  Dns,
  #[serde(rename = "EMAIL")]
  Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateProps {
  pub domain_name: String,
  pub validation: ValidationMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleProps {
  pub trusted_principals: Vec<String>,
  pub managed_policies: Vec<String>,
}

impl RoleProps {
  /// Role assumable by both regional and edge function services, allowed to
  /// write logs.
  pub fn edge_execution() -> Self {
    Self {
      trusted_principals: TRUSTED_PRINCIPALS.iter().map(|p| p.to_string()).collect(),
      managed_policies: vec![BASIC_EXECUTION_POLICY.to_string()],
    }
  }
}

/// Reference to function code by content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRef {
  pub artifact: String,
  pub content_hash: ContentHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionProps {
  pub code: CodeRef,
  pub handler: String,
  pub runtime: String,
  pub timeout_secs: u64,
  pub role: RoleRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionProps {
  pub function: FunctionRef,
  pub tag: VersionTag,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
  /// Delete the resource when the stack is torn down.
  #[default]
  Destroy,
  Retain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketProps {
  pub bucket_name: String,
  pub index_document: String,
  pub error_document: String,
  pub public_read_access: bool,
  pub removal_policy: RemovalPolicy,
}

/// Minimum TLS protocol accepted by the distribution's viewers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityPolicy {
  #[serde(rename = "TLSv1")]
  TlsV1,
  #[serde(rename = "TLSv1_2016")]
  TlsV1_2016,
  #[default]
  #[serde(rename = "TLSv1.1_2016")]
  TlsV1_1_2016,
  #[serde(rename = "TLSv1.2_2018")]
  TlsV1_2_2018,
  #[serde(rename = "TLSv1.2_2019")]
  TlsV1_2_2019,
  #[serde(rename = "TLSv1.2_2021")]
  TlsV1_2_2021,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionProps {
  pub certificate: CertificateRef,
  pub aliases: Vec<String>,
  pub security_policy: SecurityPolicy,
  pub routes: RoutingTable,
}

/// Typed properties of a node, one variant per [`ResourceKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeProps {
  Certificate(CertificateProps),
  ExecutionRole(RoleProps),
  Function(FunctionProps),
  FunctionVersion(VersionProps),
  Bucket(BucketProps),
  Distribution(DistributionProps),
}

impl NodeProps {
  pub fn kind(&self) -> ResourceKind {
    match self {
      NodeProps::Certificate(_) => ResourceKind::Certificate,
      NodeProps::ExecutionRole(_) => ResourceKind::ExecutionRole,
      NodeProps::Function(_) => ResourceKind::Function,
      NodeProps::FunctionVersion(_) => ResourceKind::FunctionVersion,
      NodeProps::Bucket(_) => ResourceKind::Bucket,
      NodeProps::Distribution(_) => ResourceKind::Distribution,
    }
  }

  /// Identifiers of the resources these properties reference, deduplicated
  /// and in first-seen order.
  pub fn dependencies(&self) -> Vec<ResourceId> {
    let mut deps = match self {
      NodeProps::Certificate(_) | NodeProps::ExecutionRole(_) | NodeProps::Bucket(_) => Vec::new(),
      NodeProps::Function(props) => vec![props.role.id().clone()],
      NodeProps::FunctionVersion(props) => vec![props.function.id().clone()],
      NodeProps::Distribution(props) => {
        let mut deps = vec![props.certificate.id().clone()];
        deps.extend(props.routes.dependencies());
        deps
      }
    };
    let mut seen = std::collections::HashSet::new();
    deps.retain(|id| seen.insert(id.clone()));
    deps
  }

  /// The parameters handed to the substrate.
  pub fn to_params(&self) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(self)
  }
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
  pub kind: ResourceKind,
  pub logical_name: String,
  pub id: ResourceId,
  pub depends_on: Vec<ResourceId>,
  pub props: NodeProps,
}
