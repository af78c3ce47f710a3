//! Declared-type descriptors.
//!
//! A `TypeRef` is what the Member Facts Provider reports for a field or
//! parameter: a shape descriptor plus declared nullability. Descriptors are
//! plain data; identity and deduplication happen in the solver's registry,
//! never here.

use crate::basic::BasicKind;
use crate::def::DeclId;
use crate::default_value::DefaultValue;

/// Declared nullability of a type use.
///
/// `Unknown` models an unannotated position. The build-wide policy is to
/// treat it as `Nullable` (see `facts::resolve_nullability`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Nullability {
    NonNullable,
    Nullable,
    Unknown,
}

/// How a list/set/dictionary use was declared.
///
/// `Concrete` is the owned collection itself, `Interface` the mutable
/// abstraction over it, `ReadOnly` the non-mutating view. Only `Concrete`
/// shapes get generated implementations; the other two canonicalize onto
/// them through their regular type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionMode {
    Concrete,
    Interface,
    ReadOnly,
}

/// One element of a declared tuple (anonymous record).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElem {
    /// `None` for positional/unnamed elements.
    pub name: Option<typegraph_common::Atom>,
    pub ty: TypeRef,
    pub default: Option<DefaultValue>,
}

impl TupleElem {
    pub fn named(name: typegraph_common::Atom, ty: TypeRef) -> Self {
        TupleElem {
            name: Some(name),
            ty,
            default: None,
        }
    }

    pub fn unnamed(ty: TypeRef) -> Self {
        TupleElem {
            name: None,
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// The shape part of a declared-type descriptor.
///
/// This is a closed sum; the solver dispatches on it exhaustively. An
/// unrepresentable host shape must be rejected by the facts provider before
/// it gets here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// The top type. Allowed as a field type, rejected as a union member.
    Any,
    Basic(BasicKind),
    /// A named declaration: record, interface, marker, or enum.
    Decl(DeclId),
    /// Value-tuple shape. Elements beyond seven arrive as a trailing
    /// unnamed tuple continuation and are flattened by the solver.
    Tuple(Vec<TupleElem>),
    Array(Box<TypeRef>),
    List(CollectionMode, Box<TypeRef>),
    Set(CollectionMode, Box<TypeRef>),
    Dictionary(CollectionMode, Box<TypeRef>, Box<TypeRef>),
    /// Field-declared alternative set; the bool is `can_extend`.
    Union(Vec<TypeRef>, bool),
}

/// A declared-type descriptor: shape plus nullability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub desc: TypeDesc,
    pub nullability: Nullability,
}

impl TypeRef {
    pub fn new(desc: TypeDesc) -> Self {
        TypeRef {
            desc,
            nullability: Nullability::NonNullable,
        }
    }

    pub fn nullable(desc: TypeDesc) -> Self {
        TypeRef {
            desc,
            nullability: Nullability::Nullable,
        }
    }

    pub fn basic(kind: BasicKind) -> Self {
        Self::new(TypeDesc::Basic(kind))
    }

    pub fn decl(id: DeclId) -> Self {
        Self::new(TypeDesc::Decl(id))
    }

    pub fn array(item: TypeRef) -> Self {
        Self::new(TypeDesc::Array(Box::new(item)))
    }

    pub fn list(mode: CollectionMode, item: TypeRef) -> Self {
        Self::new(TypeDesc::List(mode, Box::new(item)))
    }

    pub fn set(mode: CollectionMode, item: TypeRef) -> Self {
        Self::new(TypeDesc::Set(mode, Box::new(item)))
    }

    pub fn dictionary(mode: CollectionMode, key: TypeRef, value: TypeRef) -> Self {
        Self::new(TypeDesc::Dictionary(mode, Box::new(key), Box::new(value)))
    }

    pub fn tuple(elems: Vec<TupleElem>) -> Self {
        Self::new(TypeDesc::Tuple(elems))
    }

    pub fn union(members: Vec<TypeRef>, can_extend: bool) -> Self {
        Self::new(TypeDesc::Union(members, can_extend))
    }

    /// Same descriptor with nullability forced.
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn as_nullable(self) -> Self {
        self.with_nullability(Nullability::Nullable)
    }

    pub fn is_declared_nullable(&self) -> bool {
        self.nullability == Nullability::Nullable
    }
}
