//! Locking the build into an immutable type system.
//!
//! Finalization resolves every remaining canonical-form cell, runs the
//! instantiation-safety walk over the declared roots, locks the registry,
//! and either refuses (any error was recorded) or hands out the immutable
//! `TypeSystem`. The lock is irreversible; a finished builder cannot
//! register anything further either way.

use crate::arena::{Node, NodeArena};
use crate::builder::Builder;
use crate::errors::FinalizeError;
use crate::node::{NodeId, TypePair};
use crate::visitor::CycleDefaultVisitor;
use indexmap::IndexMap;
use tracing::{debug, info};
use typegraph_decl::DeclId;

/// A collection view whose item is interface-typed. The host needs a
/// covariant bridge for each of these; the build only records them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SupportShape {
    /// The view node (interface or read-only collection).
    pub view: NodeId,
    /// The interface-typed item, non-nullable variant.
    pub item: NodeId,
}

/// Counters describing a finished build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSystemStats {
    /// Node variants (two per pair).
    pub nodes: usize,
    pub pairs: usize,
    /// Declared identities mapped into the graph.
    pub decls: usize,
    pub support_shapes: usize,
}

/// The finished, immutable type graph.
#[derive(Debug)]
pub struct TypeSystem {
    arena: NodeArena,
    /// Declared identity to the oblivious node of its built pair, in
    /// `DeclId` order.
    by_decl: IndexMap<DeclId, NodeId>,
    support_shapes: Vec<SupportShape>,
}

impl TypeSystem {
    pub fn node(&self, id: NodeId) -> Node<'_> {
        self.arena.node(id)
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// All node ids: non-nullable at even positions, the nullable
    /// companion at the following odd position.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena.node_ids()
    }

    /// The oblivious node a declared identity canonicalized onto.
    pub fn oblivious_for(&self, decl: DeclId) -> Option<NodeId> {
        self.by_decl.get(&decl).copied()
    }

    pub fn decls(&self) -> impl Iterator<Item = (DeclId, NodeId)> + '_ {
        self.by_decl.iter().map(|(decl, id)| (*decl, *id))
    }

    pub fn support_shapes(&self) -> &[SupportShape] {
        &self.support_shapes
    }

    pub fn len(&self) -> usize {
        self.arena.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn stats(&self) -> TypeSystemStats {
        TypeSystemStats {
            nodes: self.arena.node_count(),
            pairs: self.arena.pair_count(),
            decls: self.by_decl.len(),
            support_shapes: self.support_shapes.len(),
        }
    }
}

/// Indexing addresses the pair; both variants of a pair share it. Use
/// [`TypeSystem::node`] for a variant-aware view.
impl std::ops::Index<NodeId> for TypeSystem {
    type Output = TypePair;

    fn index(&self, id: NodeId) -> &TypePair {
        self.arena.pair(id)
    }
}

impl<'a> Builder<'a> {
    /// Finalize the build.
    ///
    /// Fails if any error diagnostic was recorded during registration or by
    /// the instantiation-safety walk. The registry is locked in both cases.
    pub fn finish(mut self) -> Result<TypeSystem, FinalizeError> {
        // Resolve every canonical-form cell. Resolution may append new
        // pairs (concrete companions of views), which are themselves
        // resolved as the scan reaches them.
        let mut index = 0;
        while index < self.arena.pair_count() {
            let id = NodeId::from_pair(index, false);
            let _ = self.oblivious_of(id);
            let _ = self.regular_of(id);
            index += 1;
        }

        let roots: Vec<NodeId> = (0..self.families.len())
            .filter_map(|index| {
                let primary = self.families[index].primary();
                self.registry.lookup_decl(primary)
            })
            .collect();
        let mut visitor = CycleDefaultVisitor::new(&self.arena, self.names);
        self.errors += visitor.run(&roots, &mut *self.sink);

        self.registry.lock();
        if self.errors > 0 {
            debug!(errors = self.errors, "finalization refused");
            return Err(FinalizeError {
                errors: self.errors,
            });
        }

        let mut decls: Vec<(DeclId, NodeId)> = self.registry.decls().collect();
        decls.sort_by_key(|(decl, _)| *decl);
        let by_decl: IndexMap<DeclId, NodeId> = decls
            .into_iter()
            .map(|(decl, id)| {
                // Every cell was resolved by the scan above.
                let oblivious = self.arena.pair(id).oblivious.unwrap_or(id);
                (decl, oblivious)
            })
            .collect();

        let system = TypeSystem {
            arena: self.arena,
            by_decl,
            support_shapes: self.support_shapes,
        };
        let stats = system.stats();
        info!(
            pairs = stats.pairs,
            decls = stats.decls,
            support_shapes = stats.support_shapes,
            "type system finalized"
        );
        Ok(system)
    }
}

#[cfg(test)]
#[path = "tests/finalize_tests.rs"]
mod tests;
