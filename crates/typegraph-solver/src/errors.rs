//! Domain errors of the build.
//!
//! Every expected failure is a value, not a panic: builder methods return
//! `Result<NodeId, BuildError>` and the run continues best-effort so
//! independent errors surface together. Each variant maps to a stable
//! diagnostic code.

use crate::node::NodeId;
use std::fmt;
use typegraph_common::codes;
use typegraph_decl::DeclId;

/// An expected registration/resolution failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A declared type cannot be mapped to any known kind.
    UnsupportedShape(String),
    EnumMissingExternalName(DeclId),
    EnumUnderlyingNotInteger(DeclId),
    FieldTypeConflict(DeclId),
    NullabilityMismatch(DeclId),
    FieldDefaultConflict(DeclId),
    MustBeFullyMutable(DeclId),
    MultipleConstructors(DeclId),
    AmbiguousUnion(NodeId, NodeId),
    UnionErasedByAny,
    UnionMemberNullable,
    DictionaryKeyNullable(NodeId),
    DictionaryKeyNotReadOnly(NodeId),
    SetItemNotHashSafe(NodeId),
    AbstractInterfaceCycle(DeclId),
    RegistryLocked,
}

impl BuildError {
    /// The stable diagnostic code of this error.
    pub fn code(&self) -> u32 {
        match self {
            BuildError::UnsupportedShape(_) => codes::UNSUPPORTED_SHAPE,
            BuildError::EnumMissingExternalName(_) => codes::ENUM_MISSING_EXTERNAL_NAME,
            BuildError::EnumUnderlyingNotInteger(_) => codes::ENUM_UNDERLYING_NOT_INTEGER,
            BuildError::FieldTypeConflict(_) => codes::FIELD_TYPE_CONFLICT,
            BuildError::NullabilityMismatch(_) => codes::NULLABILITY_MISMATCH,
            BuildError::FieldDefaultConflict(_) => codes::FIELD_DEFAULT_CONFLICT,
            BuildError::MustBeFullyMutable(_) => codes::MUST_BE_FULLY_MUTABLE,
            BuildError::MultipleConstructors(_) => codes::MULTIPLE_CONSTRUCTORS,
            BuildError::AmbiguousUnion(_, _) => codes::AMBIGUOUS_UNION,
            BuildError::UnionErasedByAny => codes::UNION_ERASED_BY_ANY,
            BuildError::UnionMemberNullable => codes::UNION_MEMBER_NULLABLE,
            BuildError::DictionaryKeyNullable(_) => codes::DICTIONARY_KEY_NULLABLE,
            BuildError::DictionaryKeyNotReadOnly(_) => codes::DICTIONARY_KEY_NOT_READONLY,
            BuildError::SetItemNotHashSafe(_) => codes::SET_ITEM_NOT_HASH_SAFE,
            BuildError::AbstractInterfaceCycle(_) => codes::ABSTRACT_INTERFACE_CYCLE,
            BuildError::RegistryLocked => codes::REGISTRY_LOCKED,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnsupportedShape(detail) => write!(f, "unsupported shape: {detail}"),
            BuildError::EnumMissingExternalName(decl) => {
                write!(f, "enum declaration #{} has no external name", decl.0)
            }
            BuildError::EnumUnderlyingNotInteger(decl) => {
                write!(f, "enum declaration #{} underlying type is not an integer", decl.0)
            }
            BuildError::FieldTypeConflict(decl) => {
                write!(f, "conflicting field type declarations in family of #{}", decl.0)
            }
            BuildError::NullabilityMismatch(decl) => {
                write!(f, "read/write nullability disagreement on a member of #{}", decl.0)
            }
            BuildError::FieldDefaultConflict(decl) => {
                write!(f, "conflicting field defaults in family of #{}", decl.0)
            }
            BuildError::MustBeFullyMutable(decl) => {
                write!(f, "record #{} must be fully mutable", decl.0)
            }
            BuildError::MultipleConstructors(decl) => {
                write!(f, "record #{} declares more than one constructor", decl.0)
            }
            BuildError::AmbiguousUnion(left, right) => {
                write!(f, "ambiguous union: members {} and {} are related", left.0, right.0)
            }
            BuildError::UnionErasedByAny => write!(f, "union member of top type erases the union"),
            BuildError::UnionMemberNullable => {
                write!(f, "union members must not be declared nullable")
            }
            BuildError::DictionaryKeyNullable(key) => {
                write!(f, "dictionary key {} must be non-nullable", key.0)
            }
            BuildError::DictionaryKeyNotReadOnly(key) => {
                write!(f, "dictionary key {} is not read-only compliant", key.0)
            }
            BuildError::SetItemNotHashSafe(item) => {
                write!(f, "set item {} is not hash-safe", item.0)
            }
            BuildError::AbstractInterfaceCycle(decl) => {
                write!(f, "abstract interface #{} extends itself", decl.0)
            }
            BuildError::RegistryLocked => write!(f, "registry is locked; build already finalized"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Finalization refused because the run recorded errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizeError {
    /// Number of error diagnostics recorded during the run.
    pub errors: usize,
}

impl fmt::Display for FinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type system build failed with {} error(s); see diagnostics",
            self.errors
        )
    }
}

impl std::error::Error for FinalizeError {}
