//! Lua evaluation of configuration files.

use std::path::Path;

use mlua::prelude::*;
use tracing::debug;

use super::{ConfigError, StackConfig};

/// Evaluate a Lua chunk that returns the stack configuration table.
///
/// An `edgestack` global is available to the chunk:
/// - `edgestack.dir`: directory of the config file
/// - `edgestack.os`: host operating system
/// - `edgestack.env(name, default)`: read an environment variable
pub(super) fn evaluate(source: &str, path: &str, config_dir: &Path) -> Result<StackConfig, ConfigError> {
  let lua_err = |e: LuaError| ConfigError::Lua {
    path: path.to_string(),
    message: e.to_string(),
  };

  let lua = Lua::new();
  register_globals(&lua, config_dir).map_err(lua_err)?;

  let value = lua
    .load(source)
    .set_name(format!("@{path}"))
    .eval::<LuaValue>()
    .map_err(lua_err)?;

  if !value.is_table() {
    return Err(ConfigError::Lua {
      path: path.to_string(),
      message: format!("config must return a table, got {}", value.type_name()),
    });
  }

  lua.from_value(value).map_err(|e| ConfigError::Parse {
    path: path.to_string(),
    message: e.to_string(),
  })
}

fn register_globals(lua: &Lua, config_dir: &Path) -> LuaResult<()> {
  let table = lua.create_table()?;
  table.set("dir", config_dir.to_string_lossy().to_string())?;
  table.set("os", std::env::consts::OS)?;

  let env = lua.create_function(|_, (name, default): (String, Option<String>)| {
    let value = std::env::var(&name).ok().or(default);
    debug!(name = %name, found = value.is_some(), "config read environment variable");
    Ok(value)
  })?;
  table.set("env", env)?;

  lua.globals().set("edgestack", table)?;
  Ok(())
}
