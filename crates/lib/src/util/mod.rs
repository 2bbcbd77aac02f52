//! Shared utilities.
//!
//! Content hashing used by version derivation and fingerprints.

pub mod hash;
