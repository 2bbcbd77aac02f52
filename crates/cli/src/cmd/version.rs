//! Implementation of the `edgestack version` command.

use std::path::Path;

use anyhow::{Context, Result};

use edgestack_lib::artifact::{DeployableArtifact, derive_version_tag};

use crate::output::{OutputFormat, print_json};

pub fn cmd_version(path: &Path, format: OutputFormat) -> Result<()> {
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| path.display().to_string());

  let artifact = DeployableArtifact::from_path(&name, path);
  let tag = derive_version_tag(&artifact).with_context(|| format!("Failed to hash {}", path.display()))?;

  if format.is_json() {
    return print_json(&serde_json::json!({
      "artifact": name,
      "path": path,
      "tag": tag,
      "content_hash": tag.content_hash(),
    }));
  }

  println!("{}", tag);
  Ok(())
}
