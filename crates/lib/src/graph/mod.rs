//! The resource graph of a single build.
//!
//! [`build_graph`] runs the fixed pipeline
//!
//! ```text
//! certificate -> execution role -> function -> version -> bucket -> distribution -> exports
//! ```
//!
//! against a [`Substrate`]. The artifact is hashed before anything is
//! declared, so unreadable content aborts the build without side effects.
//! Each step consumes the typed references returned by earlier steps (see
//! [`GraphBuilder`]), and the finished trace is checked once more with
//! [`verify_declaration_order`] before the substrate is committed.

mod builder;
mod order;
mod stage;

use serde::Serialize;
use tracing::info;

use crate::artifact::derive_version_tag;
use crate::config::StackConfig;
use crate::error::BuildError;
use crate::export::ExportSet;
use crate::resource::{
  BucketProps, BucketRef, CertificateProps, CertificateRef, CodeRef, DistributionProps, DistributionRef,
  FunctionProps, FunctionRef, ResourceKind, ResourceNode, RoleProps, RoleRef, ValidationMethod, VersionedReference,
};
use crate::routing::{
  AllowedMethods, EdgeEventType, Origin, PathPattern, RoutingError, RoutingRule, RoutingTable,
};
use crate::substrate::Substrate;
use crate::util::hash::Hashable;

pub use builder::{BuildTrace, GraphBuilder};
pub use order::{DependencyOrderError, verify_declaration_order};
pub use stage::BuildStage;

/// Logical names of the fixed nodes. The function takes its name from the
/// artifact and the version node from its tag.
pub mod logical_names {
  pub const CERTIFICATE: &str = "RootCertificate";
  pub const EXECUTION_ROLE: &str = "EdgeExecutionRole";
  pub const BUCKET: &str = "SiteBucket";
  pub const DISTRIBUTION: &str = "SiteDistribution";
}

/// The immutable outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
  pub stack_name: String,
  pub certificate: CertificateRef,
  pub role: RoleRef,
  pub function: FunctionRef,
  pub version: VersionedReference,
  pub bucket: BucketRef,
  pub distribution: DistributionRef,
  /// Declared nodes, in declaration order.
  pub nodes: Vec<ResourceNode>,
  pub stages: Vec<BuildStage>,
  pub exports: ExportSet,
}

impl Hashable for BuildResult {}

impl BuildResult {
  /// The first node of `kind`. Every kind is declared exactly once.
  pub fn node(&self, kind: ResourceKind) -> Option<&ResourceNode> {
    self.nodes.iter().find(|n| n.kind == kind)
  }
}

/// Routing for the site: static content from the bucket by default, with the
/// edge function rewriting origin requests, and the API pattern forwarded to
/// the API domain.
pub fn site_routes(
  bucket: &BucketRef,
  version: &VersionedReference,
  api_domain: &str,
  api_pattern: PathPattern,
) -> Result<RoutingTable, RoutingError> {
  let default = RoutingRule::default_rule(Origin::Bucket { bucket: bucket.clone() })
    .with_edge_function(EdgeEventType::OriginRequest, version.clone());

  let api = RoutingRule::with_pattern(
    api_pattern,
    Origin::Custom {
      domain_name: api_domain.to_string(),
    },
  )
  .with_allowed_methods(AllowedMethods::All);

  RoutingTable::new(vec![default, api])
}

/// Build the complete graph described by `config`.
///
/// # Errors
///
/// Any error aborts the build. The substrate is only committed once every
/// node and export has been declared.
pub fn build_graph<S: Substrate>(config: &StackConfig, substrate: &mut S) -> Result<BuildResult, BuildError> {
  config.validate()?;
  let timeout = config.timeout()?;
  let api_pattern = config.api_pattern()?;

  let artifact = config.artifact();
  let tag = derive_version_tag(&artifact)?;
  let content_hash = tag.content_hash();

  info!(stack = %config.stack_name, tag = %tag, "building resource graph");

  let mut builder = GraphBuilder::new(substrate);

  let certificate = builder.declare_certificate(
    logical_names::CERTIFICATE,
    CertificateProps {
      domain_name: config.domain_name.clone(),
      validation: ValidationMethod::Dns,
    },
  )?;

  let role = builder.declare_execution_role(logical_names::EXECUTION_ROLE, RoleProps::edge_execution())?;

  let function = builder.declare_function(
    &config.artifact.name,
    FunctionProps {
      code: CodeRef {
        artifact: config.artifact.name.clone(),
        content_hash,
      },
      handler: config.artifact.handler.clone(),
      runtime: config.artifact.runtime.clone(),
      timeout_secs: timeout.as_secs(),
      role: role.clone(),
    },
  )?;

  let version = builder.declare_version(&function, &tag)?;

  let bucket = builder.declare_bucket(
    logical_names::BUCKET,
    BucketProps {
      bucket_name: config.bucket.name.clone(),
      index_document: config.bucket.index_document.clone(),
      error_document: config.bucket.error_document.clone(),
      public_read_access: false,
      removal_policy: config.bucket.removal_policy,
    },
  )?;

  let routes = site_routes(&bucket, &version, &config.api_domain_name, api_pattern)?;
  let distribution = builder.declare_distribution(
    logical_names::DISTRIBUTION,
    DistributionProps {
      certificate: certificate.clone(),
      aliases: vec![config.domain_name.clone()],
      security_policy: config.security_policy,
      routes,
    },
  )?;

  let exports = ExportSet::collect(&certificate, &version, &bucket, &distribution);
  builder.publish_exports(&exports)?;

  let BuildTrace { nodes, stages } = builder.finish()?;
  info!(stack = %config.stack_name, nodes = nodes.len(), "build complete");

  Ok(BuildResult {
    stack_name: config.stack_name.clone(),
    certificate,
    role,
    function,
    version,
    bucket,
    distribution,
    nodes,
    stages,
    exports,
  })
}
