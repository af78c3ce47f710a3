//! Collection shape registration: arrays, lists, sets, dictionaries.
//!
//! Item ids inside a collection key carry their nullability bit, so
//! `list<i32>` and `list<i32?>` are distinct pairs. View modes (interface,
//! read-only) canonicalize onto the concrete collection through their
//! regular type; a view over an interface-typed item additionally records a
//! support shape so hosts can emit the covariant bridge for it.

use crate::builder::Builder;
use crate::errors::BuildError;
use crate::finalize::SupportShape;
use crate::node::{DefaultInfo, NodeFlags, NodeId, SynthDefault, TypeKey, TypeKind, TypePair};
use typegraph_decl::{CollectionMode, TypeRef};

impl<'a> Builder<'a> {
    pub(crate) fn register_array(&mut self, item: &TypeRef) -> Result<NodeId, BuildError> {
        let item = self.register(item)?;
        Ok(self.intern_array(item))
    }

    pub(crate) fn intern_array(&mut self, item: NodeId) -> NodeId {
        let key = TypeKey::Array(item);
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::FINAL)
            .with_default(DefaultInfo::Value(SynthDefault::Empty));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.arena.pair_mut(id).regular = Some(Some(id));

        // Item goes oblivious and nullable; a node already of that form is
        // its own fixed point.
        let erased = self.oblivious_of(item).nullable();
        let oblivious = if erased == item {
            id
        } else {
            self.intern_array(erased)
        };
        self.arena.pair_mut(id).oblivious = Some(oblivious);
        id
    }

    pub(crate) fn register_list(
        &mut self,
        mode: CollectionMode,
        item: &TypeRef,
    ) -> Result<NodeId, BuildError> {
        let item = self.register(item)?;
        Ok(self.intern_list(mode, item))
    }

    pub(crate) fn intern_list(&mut self, mode: CollectionMode, item: NodeId) -> NodeId {
        let key = TypeKey::List(mode, item);
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let id = self.alloc_collection(key, mode);

        let erased = self.oblivious_of(item).nullable();
        let oblivious = if mode == CollectionMode::Concrete && erased == item {
            id
        } else {
            self.intern_list(CollectionMode::Concrete, erased)
        };
        self.arena.pair_mut(id).oblivious = Some(oblivious);

        let regular = match mode {
            CollectionMode::Concrete => Some(id),
            // A bare read-only view over the top type has no concrete
            // collection that can stand in for it.
            CollectionMode::ReadOnly if self.arena.kind(item) == TypeKind::Any => None,
            CollectionMode::Interface | CollectionMode::ReadOnly => {
                Some(self.intern_list(CollectionMode::Concrete, item))
            }
        };
        self.finish_view(id, mode, item, regular);
        id
    }

    pub(crate) fn register_set(
        &mut self,
        mode: CollectionMode,
        item: &TypeRef,
    ) -> Result<NodeId, BuildError> {
        let item = self.register(item)?;
        if !self.arena.flags(item).contains(NodeFlags::HASH_SAFE)
            || !self.arena.flags(item).contains(NodeFlags::READONLY_COMPLIANT)
        {
            let signature = self.signature(item);
            return Err(self.fail(
                BuildError::SetItemNotHashSafe(item),
                format!("set item type {signature} must be hash-safe and read-only compliant"),
            ));
        }
        Ok(self.intern_set(mode, item))
    }

    pub(crate) fn intern_set(&mut self, mode: CollectionMode, item: NodeId) -> NodeId {
        let key = TypeKey::Set(mode, item);
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let id = self.alloc_collection(key, mode);

        let erased = self.oblivious_of(item).nullable();
        let oblivious = if mode == CollectionMode::Concrete && erased == item {
            id
        } else {
            self.intern_set(CollectionMode::Concrete, erased)
        };
        self.arena.pair_mut(id).oblivious = Some(oblivious);

        let regular = match mode {
            CollectionMode::Concrete => Some(id),
            CollectionMode::Interface | CollectionMode::ReadOnly => {
                Some(self.intern_set(CollectionMode::Concrete, item))
            }
        };
        self.finish_view(id, mode, item, regular);
        id
    }

    pub(crate) fn register_dictionary(
        &mut self,
        mode: CollectionMode,
        key: &TypeRef,
        value: &TypeRef,
    ) -> Result<NodeId, BuildError> {
        let key_id = self.register(key)?;
        let value_id = self.register(value)?;
        if key_id.is_nullable() {
            let signature = self.signature(key_id);
            return Err(self.fail(
                BuildError::DictionaryKeyNullable(key_id),
                format!("dictionary key type {signature} must be non-nullable"),
            ));
        }
        if !self.arena.flags(key_id).contains(NodeFlags::READONLY_COMPLIANT) {
            let signature = self.signature(key_id);
            return Err(self.fail(
                BuildError::DictionaryKeyNotReadOnly(key_id),
                format!("dictionary key type {signature} is not read-only compliant"),
            ));
        }
        Ok(self.intern_dictionary(mode, key_id, value_id))
    }

    pub(crate) fn intern_dictionary(
        &mut self,
        mode: CollectionMode,
        key: NodeId,
        value: NodeId,
    ) -> NodeId {
        let type_key = TypeKey::Dictionary(mode, key, value);
        if let Some(id) = self.registry.lookup_key(&type_key) {
            return id;
        }
        let id = self.alloc_collection(type_key, mode);

        // Keys stay non-nullable in the oblivious form; values go nullable
        // like list items.
        let erased_key = self.oblivious_of(key).non_nullable();
        let erased_value = self.oblivious_of(value).nullable();
        let oblivious =
            if mode == CollectionMode::Concrete && erased_key == key && erased_value == value {
                id
            } else {
                self.intern_dictionary(CollectionMode::Concrete, erased_key, erased_value)
            };
        self.arena.pair_mut(id).oblivious = Some(oblivious);

        let regular = match mode {
            CollectionMode::Concrete => Some(id),
            CollectionMode::ReadOnly if self.arena.kind(value) == TypeKind::Any => None,
            CollectionMode::Interface | CollectionMode::ReadOnly => {
                Some(self.intern_dictionary(CollectionMode::Concrete, key, value))
            }
        };
        self.finish_view(id, mode, value, regular);
        id
    }

    fn alloc_collection(&mut self, key: TypeKey, mode: CollectionMode) -> NodeId {
        let flags = match mode {
            CollectionMode::Concrete => NodeFlags::FINAL,
            // Any implementation of the collection abstraction satisfies a
            // view.
            CollectionMode::Interface | CollectionMode::ReadOnly => NodeFlags::POLYMORPHIC,
        };
        let pair = TypePair::new(key.clone())
            .with_flags(flags)
            .with_default(DefaultInfo::Value(SynthDefault::Empty));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        id
    }

    /// Store a view's regular resolution, downgrade its default when no
    /// concrete form exists, and record a support shape for views over
    /// interface-typed items.
    fn finish_view(
        &mut self,
        id: NodeId,
        mode: CollectionMode,
        item: NodeId,
        regular: Option<NodeId>,
    ) {
        {
            let pair = self.arena.pair_mut(id);
            pair.regular = Some(regular);
            if regular.is_none() {
                pair.default = DefaultInfo::Disallowed;
            }
        }
        if mode != CollectionMode::Concrete && self.is_interface_like(item) {
            self.support_shapes.push(SupportShape {
                view: id,
                item: item.non_nullable(),
            });
        }
    }

    fn is_interface_like(&self, item: NodeId) -> bool {
        matches!(
            self.arena.kind(item),
            TypeKind::PrimaryInterface
                | TypeKind::SecondaryInterface
                | TypeKind::AbstractInterface
                | TypeKind::Union
        )
    }
}

#[cfg(test)]
#[path = "tests/collections_tests.rs"]
mod tests;
