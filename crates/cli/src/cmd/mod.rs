mod deploy;
mod outputs;
mod synth;
mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};

use edgestack_lib::paths;

pub use deploy::cmd_deploy;
pub use outputs::cmd_outputs;
pub use synth::cmd_synth;
pub use version::cmd_version;

/// The `--state-dir` override, or the default state directory.
fn resolve_state_dir(state_dir: Option<PathBuf>) -> Result<PathBuf> {
  state_dir
    .or_else(paths::state_dir)
    .context("Could not determine a state directory; pass --state-dir")
}
