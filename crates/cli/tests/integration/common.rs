//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the stack config, the
/// edge handler, and the state directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create from a config fixture.
  ///
  /// Copies the fixture next to `edge/rerouter.js`, keeping its extension.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join(name);
    std::fs::write(&config_path, fixture_content(name)).unwrap();

    let env = Self { temp, config_path };
    env.write_file("edge/rerouter.js", &fixture_content("rerouter.js"));
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// State directory passed with `--state-dir`.
  pub fn state_path(&self) -> PathBuf {
    let p = self.temp.path().join("state");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Data path used when no `--state-dir` is given.
  pub fn data_path(&self) -> PathBuf {
    let p = self.temp.path().join("data");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Get a pre-configured Command for the edgestack binary.
  ///
  /// Points `XDG_DATA_HOME` (and `APPDATA` on Windows) at an isolated data
  /// path and clears `RUST_LOG`.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("edgestack");
    cmd.env("XDG_DATA_HOME", self.data_path());
    cmd.env("APPDATA", self.data_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `deploy` with an explicit state directory.
  pub fn deploy(&self) -> Command {
    let mut cmd = self.cmd();
    cmd
      .arg("deploy")
      .arg(&self.config_path)
      .arg("--state-dir")
      .arg(self.state_path());
    cmd
  }
}
