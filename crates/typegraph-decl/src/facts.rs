//! The consumed Member Facts interface.
//!
//! A facts provider reports, for any declared member, its declared type,
//! read/write nullability, attribute-derived names, declared default, and
//! access kind. The core consumes these facts and never inspects host
//! reflection directly.

use crate::def::DeclId;
use crate::default_value::DefaultValue;
use crate::typeref::{Nullability, TypeRef};
use smallvec::SmallVec;
use typegraph_common::Atom;

/// How a member exposes its storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Getter only, no way to write. Disallowed on records.
    ReadOnlyAbstract,
    /// Exposed as a mutable reference to the storage.
    MutableReference,
    /// Getter plus setter.
    HasSetter,
    /// Passed and written by reference.
    ByRef,
}

/// Facts about one member, as reported by the provider.
#[derive(Clone, Debug)]
pub struct MemberFacts {
    pub declared: TypeRef,
    pub read_nullability: Nullability,
    pub write_nullability: Nullability,
    /// Attribute-resolved serialized name; `None` falls back to the member
    /// name.
    pub external_name: Option<Atom>,
    /// Names this member was previously serialized under.
    pub previous_names: SmallVec<[Atom; 2]>,
    /// Attribute-supplied default value.
    pub default: Option<DefaultValue>,
    pub access: AccessKind,
}

impl MemberFacts {
    /// Facts for an ordinary settable member; nullability taken from the
    /// declared type on both sides.
    pub fn new(declared: TypeRef) -> Self {
        let nullability = declared.nullability;
        MemberFacts {
            declared,
            read_nullability: nullability,
            write_nullability: nullability,
            external_name: None,
            previous_names: SmallVec::new(),
            default: None,
            access: AccessKind::HasSetter,
        }
    }

    pub fn with_access(mut self, access: AccessKind) -> Self {
        self.access = access;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_external_name(mut self, name: Atom) -> Self {
        self.external_name = Some(name);
        self
    }

    pub fn with_previous_names(mut self, names: impl IntoIterator<Item = Atom>) -> Self {
        self.previous_names = names.into_iter().collect();
        self
    }

    pub fn with_read_nullability(mut self, nullability: Nullability) -> Self {
        self.read_nullability = nullability;
        self
    }

    pub fn with_write_nullability(mut self, nullability: Nullability) -> Self {
        self.write_nullability = nullability;
        self
    }
}

/// The consumed provider boundary.
///
/// `DeclStore` implements this for in-memory declarations; a host binding
/// implements it over its reflection system.
pub trait FactsProvider {
    /// Facts for member `index` of declaration `decl`, or `None` if the
    /// member does not exist.
    fn member_facts(&self, decl: DeclId, index: usize) -> Option<MemberFacts>;
}

impl FactsProvider for crate::def::DeclStore {
    fn member_facts(&self, decl: DeclId, index: usize) -> Option<MemberFacts> {
        self.get(decl).members.get(index).map(|m| m.facts.clone())
    }
}

/// Disagreement between read and write nullability after normalization.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NullabilityConflict {
    pub read: Nullability,
    pub write: Nullability,
}

/// Resolve a member's effective nullability.
///
/// Policy (build-wide, see DESIGN.md): `Unknown` on either side means the
/// annotation is absent and is treated as `Nullable`. After that
/// substitution, read and write must agree; a remaining disagreement is a
/// hard registration error.
pub fn resolve_nullability(
    read: Nullability,
    write: Nullability,
) -> Result<Nullability, NullabilityConflict> {
    let normalize = |n: Nullability| match n {
        Nullability::Unknown => Nullability::Nullable,
        other => other,
    };
    let read_n = normalize(read);
    let write_n = normalize(write);
    if read_n == write_n {
        Ok(read_n)
    } else {
        Err(NullabilityConflict { read, write })
    }
}

#[cfg(test)]
#[path = "tests/facts_tests.rs"]
mod tests;
