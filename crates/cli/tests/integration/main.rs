//! CLI integration tests.

mod common;
mod deploy_tests;
mod outputs_tests;
mod synth_tests;
