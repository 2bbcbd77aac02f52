//! Implementation of the `edgestack deploy` command.
//!
//! Builds the resource graph against the stack's journal and reports what
//! changed since the previous deploy.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use edgestack_lib::build_graph;
use edgestack_lib::config::{load_config, validate_stack_name};
use edgestack_lib::substrate::{ChangeKind, JournalSubstrate, ResourceChange};

use crate::output::{OutputFormat, print_exports, print_json, print_stat, print_success, symbols};

use super::resolve_state_dir;

pub fn cmd_deploy(config_path: &Path, state_dir: Option<PathBuf>, format: OutputFormat) -> Result<()> {
  let config =
    load_config(config_path).with_context(|| format!("Failed to load config: {}", config_path.display()))?;
  validate_stack_name(&config.stack_name)
    .with_context(|| format!("Invalid stack name '{}'", config.stack_name))?;
  let state_dir = resolve_state_dir(state_dir)?;
  debug!(state_dir = %state_dir.display(), "resolved state directory");

  let mut journal = JournalSubstrate::open(&state_dir, &config.stack_name, &config.region, &config.account)
    .with_context(|| format!("Failed to open state for stack '{}'", config.stack_name))?;

  let result = build_graph(&config, &mut journal).context("Deploy failed")?;
  let generation = journal.state().generation;

  if format.is_json() {
    let output = serde_json::json!({
      "stack": result.stack_name,
      "generation": generation,
      "state_file": journal.path(),
      "changes": journal.changes(),
      "exports": result.exports,
    });
    return print_json(&output);
  }

  print_success(&format!("Deployed {} (generation {})", result.stack_name, generation));

  println!();
  println!("Changes:");
  for change in journal.changes() {
    print_change(change);
  }

  println!();
  for (label, kind) in [
    ("Created", ChangeKind::Created),
    ("Updated", ChangeKind::Updated),
    ("Unchanged", ChangeKind::Unchanged),
    ("Superseded", ChangeKind::Superseded),
  ] {
    print_stat(label, &journal.count(kind).to_string());
  }

  println!();
  println!("Exports:");
  print_exports(result.exports.iter().map(|e| (e.name.as_str(), e.value.as_str())));

  Ok(())
}

fn print_change(change: &ResourceChange) {
  let line = format!("{} {}", change.kind.as_str(), change.logical_name);
  match change.change {
    ChangeKind::Created => println!(
      "  {} {}",
      symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
      line
    ),
    ChangeKind::Updated => println!(
      "  {} {}",
      symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
      line
    ),
    ChangeKind::Superseded => println!(
      "  {} {}",
      symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()),
      line
    ),
    ChangeKind::Unchanged => println!(
      "  {} {}",
      symbols::INFO,
      line.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}
