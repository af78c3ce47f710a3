//! The type registry: structural identity to node, at most once.
//!
//! Two maps: raw declared-type identity (`DeclId`) and full structural key
//! (`TypeKey`). Construction is deduplicated by looking up before building;
//! identity equality afterwards is plain `NodeId` comparison.
//!
//! The registry is owned by exactly one builder for its whole lifetime and
//! flips to locked at finalization; a locked registry rejects every further
//! registration.

use crate::node::{NodeId, TypeKey};
use rustc_hash::FxHashMap;
use tracing::trace;
use typegraph_decl::DeclId;

#[derive(Default)]
pub struct TypeRegistry {
    by_key: FxHashMap<TypeKey, NodeId>,
    by_decl: FxHashMap<DeclId, NodeId>,
    locked: bool,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_key(&self, key: &TypeKey) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    pub fn lookup_decl(&self, decl: DeclId) -> Option<NodeId> {
        self.by_decl.get(&decl).copied()
    }

    /// Record a structural key. The pair must already be in the arena;
    /// callers insert *before* resolving children so self-referential
    /// shapes terminate.
    pub fn insert_key(&mut self, key: TypeKey, id: NodeId) {
        debug_assert!(!self.locked, "registration after lock");
        trace!(node = id.0, "TypeRegistry::insert_key");
        let previous = self.by_key.insert(key, id);
        debug_assert!(previous.is_none(), "duplicate structural key");
    }

    pub fn insert_decl(&mut self, decl: DeclId, id: NodeId) {
        debug_assert!(!self.locked, "registration after lock");
        self.by_decl.insert(decl, id);
    }

    /// Declared identities in arbitrary order; callers needing determinism
    /// sort by `DeclId`.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, NodeId)> + '_ {
        self.by_decl.iter().map(|(decl, id)| (*decl, *id))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the registry. Irreversible.
    pub fn lock(&mut self) {
        self.locked = true;
    }
}
