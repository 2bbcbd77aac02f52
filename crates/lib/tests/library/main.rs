//! Library integration tests.

mod common;
mod config_tests;
mod pipeline_tests;
