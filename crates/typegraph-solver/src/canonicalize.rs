//! Canonical form resolution.
//!
//! Every pair carries two memoized cells: the oblivious form (field names
//! erased, collection items nullable, views made concrete) and the regular
//! form (the concrete collection behind a view, if one exists). Shape
//! constructors fill the cells for everything they build depth-first;
//! these accessors are the single read path and compute any cell still
//! empty, so resolution order never matters. Termination is structural:
//! the registry is consulted before any recursive construction, and a node
//! that already is its canonical form maps to itself.

use crate::builder::Builder;
use crate::node::{NodeId, TupleFieldKey, TypeKey, TypeKind};
use typegraph_decl::CollectionMode;

impl<'a> Builder<'a> {
    /// The oblivious form of `id`, projecting `id`'s nullability.
    pub(crate) fn oblivious_of(&mut self, id: NodeId) -> NodeId {
        let base = self.compute_oblivious(id.non_nullable());
        base.with_nullability_of(id)
    }

    /// The regular form of `id`, projecting `id`'s nullability. `None`
    /// means no concrete shape can represent this node.
    pub(crate) fn regular_of(&mut self, id: NodeId) -> Option<NodeId> {
        let base = self.compute_regular(id.non_nullable());
        base.map(|regular| regular.with_nullability_of(id))
    }

    fn compute_oblivious(&mut self, id: NodeId) -> NodeId {
        if let Some(oblivious) = self.arena.pair(id).oblivious {
            return oblivious;
        }
        let key = self.arena.pair(id).key.clone();
        let oblivious = match key {
            TypeKey::Array(item) => {
                let erased = self.oblivious_of(item).nullable();
                if erased == item {
                    id
                } else {
                    self.intern_array(erased)
                }
            }
            TypeKey::List(mode, item) => {
                let erased = self.oblivious_of(item).nullable();
                if mode == CollectionMode::Concrete && erased == item {
                    id
                } else {
                    self.intern_list(CollectionMode::Concrete, erased)
                }
            }
            TypeKey::Set(mode, item) => {
                let erased = self.oblivious_of(item).nullable();
                if mode == CollectionMode::Concrete && erased == item {
                    id
                } else {
                    self.intern_set(CollectionMode::Concrete, erased)
                }
            }
            TypeKey::Dictionary(mode, key, value) => {
                let erased_key = self.oblivious_of(key).non_nullable();
                let erased_value = self.oblivious_of(value).nullable();
                if mode == CollectionMode::Concrete && erased_key == key && erased_value == value {
                    id
                } else {
                    self.intern_dictionary(CollectionMode::Concrete, erased_key, erased_value)
                }
            }
            TypeKey::AnonymousRecord(fields) => {
                let erased: Vec<TupleFieldKey> = fields
                    .iter()
                    .map(|field| TupleFieldKey {
                        ty: self.oblivious_of(field.ty),
                        name: None,
                        default: None,
                    })
                    .collect();
                if erased == fields {
                    id
                } else {
                    self.intern_tuple(erased)
                }
            }
            TypeKey::Union(_) => {
                // Unions fill their cell at construction; reaching here
                // means the cell was cleared, which does not happen.
                id
            }
            // Leaf and decl-keyed shapes are their own oblivious form;
            // secondaries resolve through their primary.
            _ => self.arena.pair(id).primary.unwrap_or(id),
        };
        let oblivious = oblivious.non_nullable();
        self.arena.pair_mut(id).oblivious = Some(oblivious);
        oblivious
    }

    fn compute_regular(&mut self, id: NodeId) -> Option<NodeId> {
        if let Some(regular) = self.arena.pair(id).regular {
            return regular;
        }
        let key = self.arena.pair(id).key.clone();
        let regular = match key {
            TypeKey::List(mode, item) if mode != CollectionMode::Concrete => {
                if mode == CollectionMode::ReadOnly && self.arena.kind(item) == TypeKind::Any {
                    None
                } else {
                    Some(self.intern_list(CollectionMode::Concrete, item))
                }
            }
            TypeKey::Set(mode, item) if mode != CollectionMode::Concrete => {
                Some(self.intern_set(CollectionMode::Concrete, item))
            }
            TypeKey::Dictionary(mode, key, value) if mode != CollectionMode::Concrete => {
                if mode == CollectionMode::ReadOnly && self.arena.kind(value) == TypeKind::Any {
                    None
                } else {
                    Some(self.intern_dictionary(CollectionMode::Concrete, key, value))
                }
            }
            _ => Some(self.arena.pair(id).primary.unwrap_or(id)),
        };
        self.arena.pair_mut(id).regular = Some(regular);
        regular
    }
}

#[cfg(test)]
#[path = "tests/canonicalize_tests.rs"]
mod tests;
