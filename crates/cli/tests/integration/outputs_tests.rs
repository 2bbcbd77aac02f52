//! Outputs command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn outputs_lists_every_export() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();

  env
    .cmd()
    .arg("outputs")
    .arg("site-global")
    .arg("--state-dir")
    .arg(env.state_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("CertificateArn"))
    .stdout(predicate::str::contains("EdgeFunctionArn"))
    .stdout(predicate::str::contains("BucketName: example-site"))
    .stdout(predicate::str::contains("DistributionId"))
    .stdout(predicate::str::contains("EdgeFunctionArnWithVersion"));
}

#[test]
fn outputs_name_prints_raw_value() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();

  env
    .cmd()
    .arg("outputs")
    .arg("site-global")
    .arg("--state-dir")
    .arg(env.state_path())
    .arg("--name")
    .arg("BucketName")
    .assert()
    .success()
    .stdout("example-site\n");
}

#[test]
fn composite_export_tracks_the_latest_deploy() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();

  let read_composite = || {
    let output = env
      .cmd()
      .arg("outputs")
      .arg("site-global")
      .arg("--state-dir")
      .arg(env.state_path())
      .arg("--name")
      .arg("EdgeFunctionArnWithVersion")
      .output()
      .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
  };

  let before = read_composite();
  env.write_file("edge/rerouter.js", "exports.handler = async (event) => event;\n");
  env.deploy().assert().success();
  let after = read_composite();

  assert_ne!(before, after);
  let (before_fn, _) = before.rsplit_once(':').unwrap();
  let (after_fn, after_tag) = after.rsplit_once(':').unwrap();
  assert_eq!(before_fn, after_fn);
  assert!(after_tag.starts_with('V'));
  assert_eq!(after_tag.len(), 65);
}

#[test]
fn outputs_for_unknown_stack_fails() {
  let env = TestEnv::from_fixture("stack.lua");

  env
    .cmd()
    .arg("outputs")
    .arg("missing-stack")
    .arg("--state-dir")
    .arg(env.state_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("No deployed stack named 'missing-stack'"));
}

#[test]
fn outputs_for_unknown_name_fails() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();

  env
    .cmd()
    .arg("outputs")
    .arg("site-global")
    .arg("--state-dir")
    .arg(env.state_path())
    .arg("--name")
    .arg("Nope")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no export named 'Nope'"));
}

#[test]
fn outputs_rejects_stack_names_that_leave_the_state_dir() {
  let env = TestEnv::from_fixture("stack.lua");
  env.deploy().assert().success();
  let nested = env.state_path().join("nested");
  std::fs::create_dir_all(&nested).unwrap();

  env
    .cmd()
    .arg("outputs")
    .arg("../site-global")
    .arg("--state-dir")
    .arg(&nested)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid stack name '../site-global'"));
}
