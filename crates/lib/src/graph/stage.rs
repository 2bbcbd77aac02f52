use std::fmt;

use serde::Serialize;

use crate::resource::ResourceKind;

/// Progress of a build through its fixed pipeline.
///
/// Each stage has exactly one successor; no stage is skipped or revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
  NotStarted,
  CertificateDeclared,
  IdentityDeclared,
  FunctionDeclared,
  VersionDerived,
  StorageDeclared,
  DistributionDeclared,
  Exported,
  Done,
}

impl BuildStage {
  pub fn next(self) -> Option<BuildStage> {
    match self {
      BuildStage::NotStarted => Some(BuildStage::CertificateDeclared),
      BuildStage::CertificateDeclared => Some(BuildStage::IdentityDeclared),
      BuildStage::IdentityDeclared => Some(BuildStage::FunctionDeclared),
      BuildStage::FunctionDeclared => Some(BuildStage::VersionDerived),
      BuildStage::VersionDerived => Some(BuildStage::StorageDeclared),
      BuildStage::StorageDeclared => Some(BuildStage::DistributionDeclared),
      BuildStage::DistributionDeclared => Some(BuildStage::Exported),
      BuildStage::Exported => Some(BuildStage::Done),
      BuildStage::Done => None,
    }
  }

  /// The stage reached once a resource of `kind` is declared.
  pub fn after(kind: ResourceKind) -> BuildStage {
    match kind {
      ResourceKind::Certificate => BuildStage::CertificateDeclared,
      ResourceKind::ExecutionRole => BuildStage::IdentityDeclared,
      ResourceKind::Function => BuildStage::FunctionDeclared,
      ResourceKind::FunctionVersion => BuildStage::VersionDerived,
      ResourceKind::Bucket => BuildStage::StorageDeclared,
      ResourceKind::Distribution => BuildStage::DistributionDeclared,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BuildStage::NotStarted => "not_started",
      BuildStage::CertificateDeclared => "certificate_declared",
      BuildStage::IdentityDeclared => "identity_declared",
      BuildStage::FunctionDeclared => "function_declared",
      BuildStage::VersionDerived => "version_derived",
      BuildStage::StorageDeclared => "storage_declared",
      BuildStage::DistributionDeclared => "distribution_declared",
      BuildStage::Exported => "exported",
      BuildStage::Done => "done",
    }
  }
}

impl fmt::Display for BuildStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
