//! edgestack-lib: Resource graph builder for edge-deployed sites
//!
//! This crate provides the pieces behind the `edgestack` CLI:
//! - `artifact`: content-derived version tags for deployable code
//! - `graph`: the ordered declaration of certificate, role, function,
//!   version, bucket and distribution
//! - `export`: values published for stacks outside this build
//! - `substrate`: backends that turn declarations into identifiers
//! - `config`: Lua and TOML stack configuration

pub mod artifact;
pub mod config;
pub mod consts;
pub mod error;
pub mod export;
pub mod graph;
pub mod paths;
pub mod resource;
pub mod routing;
pub mod substrate;
pub mod util;

pub use error::BuildError;
pub use graph::{BuildResult, build_graph};
