//! Append-only node arena.
//!
//! Nodes are addressed by stable integer index so mutual and forward
//! references cost nothing: a pair is inserted before its children are
//! resolved ("register placeholder, then fill") and instantiation safety is
//! proven separately by the cycle visitor.

use crate::node::{DefaultInfo, Field, NodeFlags, NodeId, SynthDefault, TypeKey, TypeKind, TypePair};
use tracing::trace;
use typegraph_common::Atom;
use typegraph_decl::DeclId;

/// Storage for all built pairs. Append-only; no pair is ever removed.
#[derive(Debug, Default)]
pub struct NodeArena {
    pairs: Vec<TypePair>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a pair and return the id of its non-nullable variant.
    pub fn alloc(&mut self, pair: TypePair) -> NodeId {
        let id = NodeId::from_pair(self.pairs.len(), false);
        trace!(node = id.0, kind = ?pair.kind, "NodeArena::alloc");
        self.pairs.push(pair);
        id
    }

    pub fn pair(&self, id: NodeId) -> &TypePair {
        &self.pairs[id.pair_index()]
    }

    pub fn pair_mut(&mut self, id: NodeId) -> &mut TypePair {
        &mut self.pairs[id.pair_index()]
    }

    /// Number of pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of nodes (two variants per pair).
    pub fn node_count(&self) -> usize {
        self.pairs.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All node ids in index order: non-nullable at even positions, the
    /// nullable companion at the following odd position.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count() as u32).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node {
            id,
            pair: self.pair(id),
        }
    }

    pub fn kind(&self, id: NodeId) -> TypeKind {
        self.pair(id).kind
    }

    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.pair(id).flags
    }
}

/// Read-only view of one node variant.
#[derive(Copy, Clone)]
pub struct Node<'a> {
    pub id: NodeId,
    pair: &'a TypePair,
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> TypeKind {
        self.pair.kind
    }

    pub fn key(&self) -> &'a TypeKey {
        &self.pair.key
    }

    pub fn is_nullable(&self) -> bool {
        self.id.is_nullable()
    }

    pub fn flags(&self) -> NodeFlags {
        self.pair.flags
    }

    pub fn is_final(&self) -> bool {
        self.pair.flags.contains(NodeFlags::FINAL)
    }

    pub fn is_polymorphic(&self) -> bool {
        self.pair.flags.contains(NodeFlags::POLYMORPHIC)
    }

    pub fn is_readonly_compliant(&self) -> bool {
        self.pair.flags.contains(NodeFlags::READONLY_COMPLIANT)
    }

    pub fn is_hash_safe(&self) -> bool {
        self.pair.flags.contains(NodeFlags::HASH_SAFE)
    }

    pub fn decl(&self) -> Option<DeclId> {
        self.pair.decl
    }

    pub fn name(&self) -> Option<Atom> {
        self.pair.name
    }

    /// Owned fields. Secondary interfaces own nothing; use
    /// `NodeArena::fields_of` to follow the primary.
    pub fn fields(&self) -> &'a [Field] {
        &self.pair.fields
    }

    pub fn union_members(&self) -> &'a [NodeId] {
        &self.pair.members
    }

    pub fn primary(&self) -> Option<NodeId> {
        self.pair.primary
    }

    /// Default-value info of this variant. Nullable variants always
    /// default to null.
    pub fn default(&self) -> DefaultInfo {
        if self.id.is_nullable() {
            DefaultInfo::Value(SynthDefault::Null)
        } else {
            self.pair.default.clone()
        }
    }

    /// The resolved oblivious form of this variant, projecting this
    /// variant's nullability. Resolved for every node once the system is
    /// finalized.
    pub fn oblivious(&self) -> Option<NodeId> {
        self.pair
            .oblivious
            .map(|oblivious| oblivious.with_nullability_of(self.id))
    }

    /// The resolved regular form, if one exists.
    pub fn regular(&self) -> Option<Option<NodeId>> {
        self.pair
            .regular
            .map(|regular| regular.map(|id| id.with_nullability_of(self.id)))
    }

    /// Whether this node is its own oblivious form.
    pub fn is_oblivious(&self) -> bool {
        self.pair.oblivious == Some(self.id.non_nullable())
    }
}

impl NodeArena {
    /// Fields of a node, following a secondary interface to its primary.
    pub fn fields_of(&self, id: NodeId) -> &[Field] {
        let pair = self.pair(id);
        match pair.primary {
            Some(primary) => &self.pair(primary).fields,
            None => &pair.fields,
        }
    }

    /// Default info of a node variant, following secondaries.
    pub fn default_of(&self, id: NodeId) -> DefaultInfo {
        if id.is_nullable() {
            return DefaultInfo::Value(SynthDefault::Null);
        }
        let pair = self.pair(id);
        match pair.primary {
            Some(primary) => self.pair(primary).default.clone(),
            None => pair.default.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/arena_tests.rs"]
mod tests;
