//! Declaration identifiers and storage.
//!
//! `DeclId` is the builder-owned identity of a declared record, interface,
//! marker interface, or enum. It decouples the structural core from the
//! host language's reflection handles, which also makes the whole pipeline
//! testable without a host reflection system: tests register declarations
//! directly into a `DeclStore`.

use crate::basic::BasicKind;
use crate::facts::MemberFacts;
use rustc_hash::FxHashMap;
use tracing::trace;
use typegraph_common::Atom;

/// Builder-owned declaration identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of declaration.
///
/// | Kind | Built as |
/// |------|----------|
/// | Record | named value record node |
/// | Interface | primary/secondary node of its family |
/// | Marker | abstract interface node |
/// | Enum | enum node over a registered integer type |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Record,
    Interface,
    Marker,
    Enum,
}

/// One declared member (property) of a record or interface.
#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub name: Atom,
    pub facts: MemberFacts,
}

impl MemberDecl {
    pub fn new(name: Atom, facts: MemberFacts) -> Self {
        MemberDecl { name, facts }
    }
}

/// Complete information about one declaration.
#[derive(Clone, Debug)]
pub struct DeclInfo {
    pub kind: DeclKind,
    /// Declared name (for diagnostics and signatures).
    pub name: Atom,
    /// Attribute-resolved external name; `None` means the lookup failed,
    /// which is an error for enums and falls back to `name` elsewhere.
    pub external_name: Option<Atom>,
    pub members: Vec<MemberDecl>,
    /// Extended interfaces/markers (interface inheritance edges).
    pub extends: Vec<DeclId>,
    /// For enums: the underlying basic type.
    pub enum_underlying: Option<BasicKind>,
    /// For enums: member names and integral values, in declaration order.
    pub enum_members: Vec<(Atom, i128)>,
    /// For records: number of declared constructors.
    pub constructor_count: u32,
}

impl DeclInfo {
    pub fn record(name: Atom, members: Vec<MemberDecl>) -> Self {
        DeclInfo {
            kind: DeclKind::Record,
            name,
            external_name: Some(name),
            members,
            extends: Vec::new(),
            enum_underlying: None,
            enum_members: Vec::new(),
            constructor_count: 1,
        }
    }

    pub fn interface(name: Atom, members: Vec<MemberDecl>) -> Self {
        DeclInfo {
            kind: DeclKind::Interface,
            name,
            external_name: Some(name),
            members,
            extends: Vec::new(),
            enum_underlying: None,
            enum_members: Vec::new(),
            constructor_count: 0,
        }
    }

    pub fn marker(name: Atom) -> Self {
        DeclInfo {
            kind: DeclKind::Marker,
            name,
            external_name: Some(name),
            members: Vec::new(),
            extends: Vec::new(),
            enum_underlying: None,
            enum_members: Vec::new(),
            constructor_count: 0,
        }
    }

    pub fn enumeration(name: Atom, underlying: BasicKind, members: Vec<(Atom, i128)>) -> Self {
        DeclInfo {
            kind: DeclKind::Enum,
            name,
            external_name: Some(name),
            members: Vec::new(),
            extends: Vec::new(),
            enum_underlying: Some(underlying),
            enum_members: members,
            constructor_count: 0,
        }
    }

    pub fn with_extends(mut self, extends: Vec<DeclId>) -> Self {
        self.extends = extends;
        self
    }

    pub fn with_external_name(mut self, external_name: Option<Atom>) -> Self {
        self.external_name = external_name;
        self
    }

    pub fn with_constructor_count(mut self, count: u32) -> Self {
        self.constructor_count = count;
        self
    }
}

/// One declared family: a primary interface plus its structural aliases.
///
/// The first entry is the primary and owns the authoritative field list;
/// every further interface must be unifiable with it.
#[derive(Clone, Debug)]
pub struct FamilyDecl {
    pub interfaces: Vec<DeclId>,
}

impl FamilyDecl {
    pub fn new(interfaces: Vec<DeclId>) -> Self {
        debug_assert!(!interfaces.is_empty(), "family needs a primary interface");
        FamilyDecl { interfaces }
    }

    pub fn primary(&self) -> DeclId {
        self.interfaces[0]
    }

    pub fn secondaries(&self) -> &[DeclId] {
        &self.interfaces[1..]
    }
}

/// Append-only storage for declarations.
///
/// The build is single-threaded and the declared set is closed, so this is
/// a plain vector with a name index.
#[derive(Default)]
pub struct DeclStore {
    decls: Vec<DeclInfo>,
    by_name: FxHashMap<Atom, DeclId>,
}

impl DeclStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration and return its `DeclId`.
    pub fn register(&mut self, info: DeclInfo) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        trace!(decl = id.0, kind = ?info.kind, "DeclStore::register");
        self.by_name.insert(info.name, id);
        self.decls.push(info);
        id
    }

    pub fn get(&self, id: DeclId) -> &DeclInfo {
        &self.decls[id.index()]
    }

    pub fn lookup(&self, name: Atom) -> Option<DeclId> {
        self.by_name.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declaration ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    /// All marker declarations, in registration order.
    pub fn markers(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.ids().filter(|id| self.get(*id).kind == DeclKind::Marker)
    }
}

#[cfg(test)]
#[path = "tests/def_tests.rs"]
mod tests;
