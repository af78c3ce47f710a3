//! The structural type-graph builder.
//!
//! Declarations (from `typegraph-decl`) are registered into a canonical,
//! deduplicated graph of type nodes. Every node exists as an inseparable
//! (non-nullable, nullable) pair; structural identity is interned in a
//! registry so equal shapes are the same node and equivalence afterwards
//! is id comparison. Finalization proves instantiation safety, locks the
//! graph, and hands out an immutable [`TypeSystem`].
//!
//! Entry points: [`Builder::new`], [`Builder::build`], [`Builder::finish`].

mod arena;
mod builder;
mod canonicalize;
mod collections;
mod errors;
mod finalize;
mod interfaces;
mod node;
mod records;
mod registry;
mod signature;
mod unions;
mod visitor;

pub use arena::{Node, NodeArena};
pub use builder::Builder;
pub use errors::{BuildError, FinalizeError};
pub use finalize::{SupportShape, TypeSystem, TypeSystemStats};
pub use node::{
    DefaultInfo, Field, NodeFlags, NodeId, SynthDefault, TupleFieldKey, TypeKey, TypeKind,
    TypePair,
};
pub use registry::TypeRegistry;
pub use signature::{SignaturePool, signature_string, write_signature};
pub use visitor::CycleDefaultVisitor;
