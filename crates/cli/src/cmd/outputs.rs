//! Outputs command implementation.
//!
//! Reads the exports recorded by the last successful deploy of a stack.

use std::path::PathBuf;

use anyhow::{Context, Result};

use edgestack_lib::config::validate_stack_name;
use edgestack_lib::substrate::{JournalSubstrate, StackState};

use crate::output::{OutputFormat, print_exports, print_info, print_json};

use super::resolve_state_dir;

pub fn cmd_outputs(stack: &str, state_dir: Option<PathBuf>, name: Option<&str>, format: OutputFormat) -> Result<()> {
  validate_stack_name(stack).with_context(|| format!("Invalid stack name '{}'", stack))?;
  let state_dir = resolve_state_dir(state_dir)?;
  let path = JournalSubstrate::state_path(&state_dir, stack);

  let state = StackState::load(&path)
    .with_context(|| format!("Failed to read state file: {}", path.display()))?
    .with_context(|| format!("No deployed stack named '{}' in {}", stack, state_dir.display()))?;

  if let Some(name) = name {
    let value = state
      .exports
      .get(name)
      .with_context(|| format!("Stack '{}' has no export named '{}'", stack, name))?;

    if format.is_json() {
      return print_json(&serde_json::json!({ "name": name, "value": value }));
    }
    println!("{}", value);
    return Ok(());
  }

  if format.is_json() {
    return print_json(&state.exports);
  }

  print_info(&format!("Exports of {} (generation {})", state.stack_name, state.generation));
  print_exports(state.exports.iter().map(|(k, v)| (k.as_str(), v.as_str())));
  Ok(())
}
