//! The type-node model.
//!
//! Every node exists as an inseparable (non-nullable, nullable) pair. The
//! arena stores one `TypePair` per pair and `NodeId` addresses a variant:
//! the non-nullable variant sits at the even index, its nullable companion
//! at the following odd index. That makes the pairing invariant
//! (`n.nullable().non_nullable() == n`) a bit operation instead of a
//! bookkeeping promise.

use bitflags::bitflags;
use smallvec::SmallVec;
use typegraph_common::Atom;
use typegraph_decl::{AccessKind, BasicKind, CollectionMode, DeclId, DefaultValue};

/// Identifier of one type-node variant.
///
/// Low bit = nullability; the remaining bits index the pair arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn pair_index(self) -> usize {
        (self.0 >> 1) as usize
    }

    #[inline]
    pub fn is_nullable(self) -> bool {
        self.0 & 1 == 1
    }

    /// The nullable variant of this pair.
    #[inline]
    pub fn nullable(self) -> NodeId {
        NodeId(self.0 | 1)
    }

    /// The non-nullable variant of this pair.
    #[inline]
    pub fn non_nullable(self) -> NodeId {
        NodeId(self.0 & !1)
    }

    /// The other variant of this pair.
    #[inline]
    pub fn companion(self) -> NodeId {
        NodeId(self.0 ^ 1)
    }

    #[inline]
    pub fn from_pair(index: usize, nullable: bool) -> NodeId {
        NodeId(((index as u32) << 1) | u32::from(nullable))
    }

    /// Project the nullability of `self` onto another pair.
    #[inline]
    pub fn with_nullability_of(self, other: NodeId) -> NodeId {
        if other.is_nullable() {
            self.nullable()
        } else {
            self.non_nullable()
        }
    }
}

/// The closed set of node kinds. Dispatch over shapes matches on this (or
/// on `TypeKey`) exhaustively; the set is fixed and known in full.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Any,
    Basic,
    Enum,
    NamedRecord,
    AnonymousRecord,
    Array,
    List,
    Set,
    Dictionary,
    PrimaryInterface,
    SecondaryInterface,
    AbstractInterface,
    Union,
}

bitflags! {
    /// Structural facts about a pair, shared by both variants.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// No further specialization of this shape can exist.
        const FINAL = 1 << 0;
        /// More than one runtime shape can satisfy this node.
        const POLYMORPHIC = 1 << 1;
        /// Safe to expose through a non-owning, non-mutating view
        /// (usable as a dictionary key).
        const READONLY_COMPLIANT = 1 << 2;
        /// Safe to hash (usable as a set item).
        const HASH_SAFE = 1 << 3;
    }
}

/// One field of a tuple structural key: registered type, declared name (or
/// unnamed), and the default-value part of the signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleFieldKey {
    pub ty: NodeId,
    pub name: Option<Atom>,
    pub default: Option<DefaultValue>,
}

/// Structural identity of a pair. At most one pair exists per distinct key.
///
/// Item/key/value `NodeId`s inside a key carry their nullability bit, so
/// `List<Foo>` and `List<Foo?>` are distinct identities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any,
    Basic(BasicKind),
    Enum(DeclId),
    NamedRecord(DeclId),
    AnonymousRecord(Vec<TupleFieldKey>),
    Array(NodeId),
    List(CollectionMode, NodeId),
    Set(CollectionMode, NodeId),
    Dictionary(CollectionMode, NodeId, NodeId),
    PrimaryInterface(DeclId),
    SecondaryInterface(DeclId),
    AbstractInterface(DeclId),
    /// Sorted, deduplicated member set.
    Union(Vec<NodeId>),
}

impl TypeKey {
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeKey::Any => TypeKind::Any,
            TypeKey::Basic(_) => TypeKind::Basic,
            TypeKey::Enum(_) => TypeKind::Enum,
            TypeKey::NamedRecord(_) => TypeKind::NamedRecord,
            TypeKey::AnonymousRecord(_) => TypeKind::AnonymousRecord,
            TypeKey::Array(_) => TypeKind::Array,
            TypeKey::List(_, _) => TypeKind::List,
            TypeKey::Set(_, _) => TypeKind::Set,
            TypeKey::Dictionary(_, _, _) => TypeKind::Dictionary,
            TypeKey::PrimaryInterface(_) => TypeKind::PrimaryInterface,
            TypeKey::SecondaryInterface(_) => TypeKind::SecondaryInterface,
            TypeKey::AbstractInterface(_) => TypeKind::AbstractInterface,
            TypeKey::Union(_) => TypeKind::Union,
        }
    }
}

/// A default the builder can synthesize for a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SynthDefault {
    /// A literal value (built-in zero, declared literal, enum member).
    Literal(DefaultValue),
    /// The null value of a nullable variant.
    Null,
    /// An empty collection.
    Empty,
    /// Parameterless construction of the type itself. Whether that
    /// construction terminates is proven by the cycle visitor, not here.
    Instance,
    /// Delegate to a union member's own default.
    Member(NodeId),
}

/// Default-value information of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultInfo {
    /// No default exists for this shape.
    None,
    /// A synthesizable default.
    Value(SynthDefault),
    /// A default can never exist (top type, abstract interface).
    Disallowed,
}

impl DefaultInfo {
    pub fn is_synthesizable(&self) -> bool {
        matches!(self, DefaultInfo::Value(_))
    }
}

/// One field of a record or primary interface.
///
/// The type is a structural reference into the arena, not owned.
#[derive(Clone, Debug)]
pub struct Field {
    /// Stable position within the owner.
    pub index: u32,
    /// Resolved serialized name; `None` for unnamed tuple fields.
    pub name: Option<Atom>,
    /// Names this field was previously serialized under.
    pub previous_names: SmallVec<[Atom; 2]>,
    pub ty: NodeId,
    /// Attribute-supplied default, if any.
    pub default: Option<DefaultValue>,
    pub access: AccessKind,
}

/// Arena payload of one (non-nullable, nullable) pair.
///
/// `oblivious` and `regular` are memoized cells: `None` means not yet
/// resolved. They are filled lazily before the lock step and never after.
#[derive(Clone, Debug)]
pub struct TypePair {
    pub key: TypeKey,
    pub kind: TypeKind,
    pub flags: NodeFlags,
    /// Declared-type identity, for decl-keyed nodes.
    pub decl: Option<DeclId>,
    /// Display name, for decl-keyed nodes.
    pub name: Option<Atom>,
    /// Owned fields (named/anonymous records and primary interfaces).
    pub fields: Vec<Field>,
    /// Union alternatives or abstract-interface members.
    pub members: Vec<NodeId>,
    /// For secondary interfaces: the field-owning primary.
    pub primary: Option<NodeId>,
    /// For unions: the declaration-order member whose default is reused.
    pub default_member: Option<NodeId>,
    /// Default of the non-nullable variant; the nullable variant always
    /// defaults to null.
    pub default: DefaultInfo,
    /// Canonical field-name-erased, nullable-item form (non-nullable id).
    pub oblivious: Option<NodeId>,
    /// Concrete non-view form; `Some(None)` means no concrete collection
    /// can represent this view.
    pub regular: Option<Option<NodeId>>,
}

impl TypePair {
    /// A fresh pair with nothing resolved yet.
    pub fn new(key: TypeKey) -> Self {
        let kind = key.kind();
        TypePair {
            key,
            kind,
            flags: NodeFlags::empty(),
            decl: None,
            name: None,
            fields: Vec::new(),
            members: Vec::new(),
            primary: None,
            default_member: None,
            default: DefaultInfo::None,
            oblivious: None,
            regular: None,
        }
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_decl(mut self, decl: DeclId, name: Atom) -> Self {
        self.decl = Some(decl);
        self.name = Some(name);
        self
    }

    pub fn with_default(mut self, default: DefaultInfo) -> Self {
        self.default = default;
        self
    }
}
