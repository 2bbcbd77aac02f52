//! Synth command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn synth_lists_resources_in_order() {
  let env = TestEnv::from_fixture("stack.lua");

  let output = env.cmd().arg("synth").arg(&env.config_path).output().unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let positions: Vec<usize> = [
    "certificate ",
    "execution_role ",
    "function ",
    "function_version ",
    "bucket ",
    "distribution ",
  ]
  .iter()
  .map(|kind| stdout.find(kind).unwrap_or_else(|| panic!("missing {kind} in:\n{stdout}")))
  .collect();

  assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order:\n{stdout}");
  assert!(stdout.contains("EdgeFunctionArnWithVersion"));
}

#[test]
fn synth_json_is_the_build_result() {
  let env = TestEnv::from_fixture("stack.lua");

  let output = env
    .cmd()
    .arg("synth")
    .arg(&env.config_path)
    .arg("--format")
    .arg("json")
    .output()
    .unwrap();
  assert!(output.status.success());

  let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(result["stack_name"], "site-global");
  assert_eq!(result["nodes"].as_array().unwrap().len(), 6);
  assert_eq!(result["stages"].as_array().unwrap().last().unwrap(), "done");

  let exports = result["exports"].as_array().unwrap();
  let composite = exports
    .iter()
    .find(|e| e["name"] == "EdgeFunctionArnWithVersion")
    .unwrap();
  let tag = result["version"]["tag"].as_str().unwrap();
  assert!(composite["value"].as_str().unwrap().ends_with(&format!(":{tag}")));
}

#[test]
fn synth_toml_matches_lua() {
  let lua = TestEnv::from_fixture("stack.lua");
  let toml = TestEnv::from_fixture("stack.toml");

  let run = |env: &TestEnv| {
    let output = env
      .cmd()
      .arg("synth")
      .arg(&env.config_path)
      .arg("--format")
      .arg("json")
      .output()
      .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    result["exports"].clone()
  };

  assert_eq!(run(&lua), run(&toml));
}

#[test]
fn synth_rejects_invalid_config() {
  let env = TestEnv::from_fixture("stack.lua");
  env.write_file(
    "stack.lua",
    r#"
return {
  stack_name = "site-global",
  domain_name = "www.example.com",
  api_domain_name = "api.example.com",
  region = "eu-west-1",
  artifact = { path = "edge/rerouter.js", handler = "rerouter.handler" },
  bucket = { name = "example-site" },
}
"#,
  );

  env
    .cmd()
    .arg("synth")
    .arg(&env.config_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("us-east-1"));
}

#[test]
fn synth_reads_environment_through_lua() {
  let env = TestEnv::from_fixture("stack.lua");

  env
    .cmd()
    .arg("synth")
    .arg(&env.config_path)
    .arg("--format")
    .arg("json")
    .env("SITE_DOMAIN", "example.org")
    .assert()
    .success()
    .stdout(predicate::str::contains("www.example.org"));
}
