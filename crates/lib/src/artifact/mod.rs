//! Deployable artifacts and content-derived version tags.
//!
//! An edge function may only be re-versioned when its code actually changes.
//! The version tag is therefore derived from the artifact bytes alone: two
//! builds over unchanged content produce the same tag, so the version
//! declaration is a no-op on the substrate, while any content change mints a
//! new tag and with it a new version node.
//!
//! # Tag Format
//!
//! `V` followed by the 64-character lowercase hex SHA-256 of the content.
//! The leading letter satisfies substrates that require identifiers to start
//! with a letter, and the whole tag is `[A-Za-z0-9]`.

mod types;

pub use types::*;
