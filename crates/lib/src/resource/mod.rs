//! Resource nodes and the typed references that connect them.
//!
//! Every declared resource is a [`ResourceNode`]: a kind, a logical name, the
//! identifier assigned by the substrate, and typed properties ([`NodeProps`]).
//! Properties that point at other resources hold typed references
//! ([`RoleRef`], [`FunctionRef`], [`VersionedReference`], ...) rather than raw
//! strings. References are only minted by the graph builder after a
//! successful declaration, so a node cannot be described in terms of a
//! resource that does not exist yet.

mod types;

pub use types::*;
