//! Declared-type input model for the typegraph builder.
//!
//! This crate is the boundary between the host language's reflection world
//! and the structural core. It provides:
//!
//! - `BasicKind`: the closed allow-list of basic value shapes
//! - `TypeRef` / `TypeDesc`: declared-type descriptors with nullability
//! - `DeclStore`: registration of record/interface/marker/enum declarations
//! - `MemberFacts` / `FactsProvider`: the consumed member-facts interface
//!
//! Nothing in here builds type nodes; the solver crate consumes these
//! descriptors and facts to construct the canonical graph.

pub mod basic;
pub use basic::BasicKind;

pub mod default_value;
pub use default_value::{DefaultValue, OrderedFloat};

pub mod typeref;
pub use typeref::{CollectionMode, Nullability, TupleElem, TypeDesc, TypeRef};

pub mod def;
pub use def::{DeclId, DeclInfo, DeclKind, DeclStore, FamilyDecl, MemberDecl};

pub mod facts;
pub use facts::{AccessKind, FactsProvider, MemberFacts, resolve_nullability};
