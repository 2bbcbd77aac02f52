//! Deploy command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn first_deploy_creates_everything() {
  let env = TestEnv::from_fixture("stack.lua");

  env
    .deploy()
    .assert()
    .success()
    .stdout(predicate::str::contains("Deployed site-global (generation 1)"))
    .stdout(predicate::str::contains("Created: 6"));

  assert!(env.state_path().join("site-global.json").is_file());
}

#[test]
fn deploy_is_idempotent() {
  let env = TestEnv::from_fixture("stack.lua");

  env.deploy().assert().success();

  env
    .deploy()
    .assert()
    .success()
    .stdout(predicate::str::contains("generation 2"))
    .stdout(predicate::str::contains("Unchanged: 6"))
    .stdout(predicate::str::contains("Created: 0"));
}

#[test]
fn changed_handler_supersedes_old_version() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();

  env.write_file("edge/rerouter.js", "exports.handler = async (event) => event;\n");

  let output = env.deploy().arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let changes = result["changes"].as_array().unwrap();
  let count = |change: &str| changes.iter().filter(|c| c["change"] == change).count();

  assert_eq!(count("created"), 1);
  assert_eq!(count("superseded"), 1);
  assert_eq!(count("updated"), 2);
  assert_eq!(count("unchanged"), 3);
}

#[test]
fn deploy_defaults_to_data_dir() {
  let env = TestEnv::from_fixture("stack.lua");

  env.cmd().arg("deploy").arg(&env.config_path).assert().success();

  assert!(
    env
      .data_path()
      .join("edgestack")
      .join("state")
      .join("site-global.json")
      .is_file()
  );
}

#[test]
fn deploy_with_missing_artifact_fails_without_state() {
  let env = TestEnv::from_fixture("stack.lua");
  std::fs::remove_file(env.temp.path().join("edge/rerouter.js")).unwrap();

  env
    .deploy()
    .assert()
    .failure()
    .stderr(predicate::str::contains("Deploy failed"));

  assert!(!env.state_path().join("site-global.json").exists());
}

#[test]
fn verbose_logs_declarations() {
  let env = TestEnv::from_fixture("stack.lua");

  env
    .deploy()
    .arg("--verbose")
    .assert()
    .success()
    .stderr(predicate::str::contains("declared resource"));
}
