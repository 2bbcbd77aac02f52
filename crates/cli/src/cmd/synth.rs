//! Implementation of the `edgestack synth` command.
//!
//! Builds the resource graph against an in-memory substrate and prints the
//! declared nodes and exports. Nothing is persisted.

use std::path::Path;

use anyhow::{Context, Result};

use edgestack_lib::build_graph;
use edgestack_lib::config::load_config;
use edgestack_lib::substrate::InMemorySubstrate;
use edgestack_lib::util::hash::Hashable;

use crate::output::{OutputFormat, print_exports, print_json, print_success, symbols, truncate_hash};

pub fn cmd_synth(config_path: &Path, format: OutputFormat) -> Result<()> {
  let config =
    load_config(config_path).with_context(|| format!("Failed to load config: {}", config_path.display()))?;

  let mut substrate = InMemorySubstrate::new(&config.region, &config.account);
  let result = build_graph(&config, &mut substrate).context("Failed to build resource graph")?;

  if format.is_json() {
    return print_json(&result);
  }

  let fingerprint = result.compute_hash().context("Failed to fingerprint build")?;
  print_success(&format!(
    "Synthesized {} ({})",
    result.stack_name,
    truncate_hash(&fingerprint.0)
  ));

  println!();
  println!("Resources:");
  for node in &result.nodes {
    println!("  {} {:<17} {}", symbols::INFO, node.kind.as_str(), node.logical_name);
  }

  println!();
  println!("Exports:");
  print_exports(result.exports.iter().map(|e| (e.name.as_str(), e.value.as_str())));

  Ok(())
}
