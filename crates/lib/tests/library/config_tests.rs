//! Loading configuration from disk.

use edgestack_lib::config::{ConfigError, load_config};
use edgestack_lib::resource::{RemovalPolicy, SecurityPolicy};

use super::common::{HANDLER_V1, Project};

#[test]
fn lua_config_fills_defaults() {
  let project = Project::new(HANDLER_V1);
  let config = load_config(&project.config_path()).unwrap();

  assert_eq!(config.region, "us-east-1");
  assert_eq!(config.api_path_pattern, "api/*");
  assert_eq!(config.security_policy, SecurityPolicy::default());
  assert_eq!(config.artifact.name, "edge-rerouter");
  assert_eq!(config.artifact.runtime, "nodejs18.x");
  assert_eq!(config.artifact.timeout, "3s");
  assert_eq!(config.bucket.index_document, "index.html");
  assert_eq!(config.bucket.error_document, "200.html");
  assert_eq!(config.bucket.removal_policy, RemovalPolicy::Destroy);
  assert!(config.artifact.path.is_absolute());
  assert!(config.artifact.path.ends_with("edge/rerouter.js"));
  config.validate().unwrap();
}

#[test]
fn lua_config_can_compute_values() {
  let project = Project::new(HANDLER_V1);
  project.write(
    "stack.lua",
    r#"
local domain = "example.com"
return {
  stack_name = "site-global",
  domain_name = "www." .. domain,
  api_domain_name = "api." .. domain,
  artifact = { path = edgestack.dir .. "/edge/rerouter.js", handler = "rerouter.handler" },
  bucket = { name = "example-site", removal_policy = "retain" },
}
"#,
  );

  let config = load_config(&project.config_path()).unwrap();
  assert_eq!(config.domain_name, "www.example.com");
  assert_eq!(config.api_domain_name, "api.example.com");
  assert_eq!(config.bucket.removal_policy, RemovalPolicy::Retain);
  assert!(config.artifact.path.is_file());
}

#[test]
fn api_pattern_over_static_assets_is_rejected() {
  let project = Project::new(HANDLER_V1);
  project.write(
    "stack.lua",
    r#"
return {
  stack_name = "site-global",
  domain_name = "www.example.com",
  api_domain_name = "api.example.com",
  api_path_pattern = "_nuxt/*",
  reserved_static_prefixes = { "_nuxt/" },
  artifact = { path = "edge/rerouter.js", handler = "rerouter.handler" },
  bucket = { name = "example-site" },
}
"#,
  );

  let config = load_config(&project.config_path()).unwrap();
  assert!(matches!(config.validate(), Err(ConfigError::Routing(_))));
}

#[test]
fn config_errors_name_the_file() {
  let project = Project::new(HANDLER_V1);
  project.write("stack.lua", "return 42");

  let err = load_config(&project.config_path()).unwrap_err();
  assert!(err.to_string().contains("stack.lua"), "unexpected error: {err}");
  assert!(project.root().join("stack.lua").exists());
}
