use std::collections::HashSet;

use tracing::info;

use crate::artifact::VersionTag;
use crate::error::BuildError;
use crate::export::ExportSet;
use crate::resource::{
  BucketProps, BucketRef, CertificateProps, CertificateRef, DistributionProps, DistributionRef, FunctionProps,
  FunctionRef, NodeProps, ResourceId, ResourceNode, RoleProps, RoleRef, VersionProps, VersionedReference,
};
use crate::substrate::Substrate;

use super::order::{DependencyOrderError, verify_declaration_order};
use super::stage::BuildStage;

/// The declarations of a completed build.
#[derive(Debug, Clone)]
pub struct BuildTrace {
  pub nodes: Vec<ResourceNode>,
  pub stages: Vec<BuildStage>,
}

/// Declares resources against a substrate, one pipeline stage at a time.
///
/// Every step takes the typed references of its dependencies and returns the
/// typed reference of what it declared. Two runtime checks back this up:
/// references must have been minted by this builder, and steps must follow
/// [`BuildStage::next`].
pub struct GraphBuilder<'a, S: Substrate> {
  substrate: &'a mut S,
  stage: BuildStage,
  stages: Vec<BuildStage>,
  nodes: Vec<ResourceNode>,
  declared: HashSet<ResourceId>,
}

impl<'a, S: Substrate> GraphBuilder<'a, S> {
  pub fn new(substrate: &'a mut S) -> Self {
    Self {
      substrate,
      stage: BuildStage::NotStarted,
      stages: vec![BuildStage::NotStarted],
      nodes: Vec::new(),
      declared: HashSet::new(),
    }
  }

  pub fn stage(&self) -> BuildStage {
    self.stage
  }

  pub fn nodes(&self) -> &[ResourceNode] {
    &self.nodes
  }

  pub fn declare_certificate(
    &mut self,
    logical_name: &str,
    props: CertificateProps,
  ) -> Result<CertificateRef, BuildError> {
    let id = self.declare(logical_name, NodeProps::Certificate(props))?;
    Ok(CertificateRef::new(id))
  }

  pub fn declare_execution_role(&mut self, logical_name: &str, props: RoleProps) -> Result<RoleRef, BuildError> {
    let id = self.declare(logical_name, NodeProps::ExecutionRole(props))?;
    Ok(RoleRef::new(id))
  }

  pub fn declare_function(&mut self, logical_name: &str, props: FunctionProps) -> Result<FunctionRef, BuildError> {
    let id = self.declare(logical_name, NodeProps::Function(props))?;
    Ok(FunctionRef::new(id, logical_name))
  }

  /// Pin `function` to `tag`.
  ///
  /// The tag doubles as the logical name of the version node, so unchanged
  /// content re-declares the same node and changed content declares a new
  /// one.
  pub fn declare_version(&mut self, function: &FunctionRef, tag: &VersionTag) -> Result<VersionedReference, BuildError> {
    let props = VersionProps {
      function: function.clone(),
      tag: tag.clone(),
    };
    let id = self.declare(tag.as_str(), NodeProps::FunctionVersion(props))?;
    Ok(VersionedReference::new(function.clone(), tag.clone(), id))
  }

  pub fn declare_bucket(&mut self, logical_name: &str, props: BucketProps) -> Result<BucketRef, BuildError> {
    let bucket_name = props.bucket_name.clone();
    let id = self.declare(logical_name, NodeProps::Bucket(props))?;
    Ok(BucketRef::new(id, &bucket_name))
  }

  pub fn declare_distribution(
    &mut self,
    logical_name: &str,
    props: DistributionProps,
  ) -> Result<DistributionRef, BuildError> {
    let id = self.declare(logical_name, NodeProps::Distribution(props))?;
    Ok(DistributionRef::new(id))
  }

  /// Publish the exports of this build.
  pub fn publish_exports(&mut self, exports: &ExportSet) -> Result<(), BuildError> {
    self.check_next(BuildStage::Exported)?;
    exports.publish(&mut *self.substrate)?;
    self.enter(BuildStage::Exported);
    Ok(())
  }

  /// Commit the substrate and verify the declaration trace.
  pub fn finish(mut self) -> Result<BuildTrace, BuildError> {
    self.check_next(BuildStage::Done)?;
    verify_declaration_order(&self.nodes)?;
    self.substrate.commit()?;
    self.enter(BuildStage::Done);

    Ok(BuildTrace {
      nodes: self.nodes,
      stages: self.stages,
    })
  }

  fn declare(&mut self, logical_name: &str, props: NodeProps) -> Result<ResourceId, BuildError> {
    let kind = props.kind();
    let depends_on = props.dependencies();

    if let Some(missing) = depends_on.iter().find(|id| !self.declared.contains(*id)) {
      return Err(
        DependencyOrderError::UndeclaredReference {
          kind,
          name: logical_name.to_string(),
          missing: missing.clone(),
        }
        .into(),
      );
    }

    let target = BuildStage::after(kind);
    self.check_next(target)?;

    let params = props.to_params()?;
    let id = self.substrate.declare(kind, logical_name, &params)?;
    info!(kind = %kind, name = logical_name, id = %id, "declared resource");

    self.declared.insert(id.clone());
    self.nodes.push(ResourceNode {
      kind,
      logical_name: logical_name.to_string(),
      id: id.clone(),
      depends_on,
      props,
    });
    self.enter(target);

    Ok(id)
  }

  fn check_next(&self, attempted: BuildStage) -> Result<(), DependencyOrderError> {
    if self.stage.next() != Some(attempted) {
      return Err(DependencyOrderError::OutOfSequence {
        current: self.stage,
        attempted,
      });
    }
    Ok(())
  }

  fn enter(&mut self, stage: BuildStage) {
    self.stage = stage;
    self.stages.push(stage);
  }
}
