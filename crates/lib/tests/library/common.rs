//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const HANDLER_V1: &str = "exports.handler = async (event) => event.Records[0].cf.request;\n";
pub const HANDLER_V2: &str = "exports.handler = async (event) => {\n  const request = event.Records[0].cf.request;\n  request.uri = request.uri.replace(/\\/$/, '/index.html');\n  return request;\n};\n";

/// A stack project on disk: a Lua config next to an edge handler.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new(handler: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let project = Self { temp };
    project.write("edge/rerouter.js", handler);
    project.write("stack.lua", STACK_LUA);
    project
  }

  pub fn write(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn config_path(&self) -> PathBuf {
    self.temp.path().join("stack.lua")
  }

  pub fn state_dir(&self) -> PathBuf {
    self.temp.path().join("state")
  }
}

pub const STACK_LUA: &str = r#"
return {
  stack_name = "site-global",
  domain_name = "www.example.com",
  api_domain_name = "api.example.com",
  account = "123456789012",
  reserved_static_prefixes = { "_nuxt/" },
  artifact = {
    path = "edge/rerouter.js",
    handler = "rerouter.handler",
  },
  bucket = {
    name = "example-site",
  },
}
"#;
