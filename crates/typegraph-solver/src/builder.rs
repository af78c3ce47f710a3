//! The registration engine.
//!
//! `Builder` owns the registry and arena exclusively for the whole run and
//! performs one synchronous, depth-first pass over the declared families.
//! Resolution order for any declared-type descriptor: registry hit by raw
//! declared identity or structural key first, otherwise dispatch by shape.
//!
//! Expected failures are values (`BuildError`), reported through the sink
//! and returned; the run keeps going so independent errors from the same
//! run all surface.

use crate::arena::NodeArena;
use crate::errors::BuildError;
use crate::finalize::SupportShape;
use crate::node::{DefaultInfo, NodeFlags, NodeId, SynthDefault, TypeKey, TypePair};
use crate::registry::TypeRegistry;
use crate::signature::{SignaturePool, signature_string};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use typegraph_common::{Diagnostic, DiagnosticSink, Interner};
use typegraph_decl::{
    BasicKind, DeclId, DeclKind, DeclStore, FactsProvider, FamilyDecl, Nullability, TypeDesc,
    TypeRef,
};

/// Memoized abstract-interface resolution state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AbstractState {
    InProgress,
    Done(NodeId),
}

/// The type-system builder. One instance per run; not reentrant once
/// finalized.
pub struct Builder<'a> {
    pub(crate) decls: &'a DeclStore,
    pub(crate) facts: &'a dyn FactsProvider,
    pub(crate) names: &'a Interner,
    pub(crate) families: Vec<FamilyDecl>,
    /// Interface declaration -> index into `families`.
    pub(crate) family_of: FxHashMap<DeclId, usize>,
    pub(crate) abstract_state: FxHashMap<DeclId, AbstractState>,
    pub(crate) arena: NodeArena,
    pub(crate) registry: TypeRegistry,
    pub(crate) support_shapes: Vec<SupportShape>,
    pub(crate) sink: &'a mut dyn DiagnosticSink,
    /// Errors reported by this builder; finalization fails if nonzero.
    pub(crate) errors: usize,
    pub(crate) sig_pool: SignaturePool,
}

impl<'a> Builder<'a> {
    pub fn new(
        decls: &'a DeclStore,
        facts: &'a dyn FactsProvider,
        names: &'a Interner,
        families: Vec<FamilyDecl>,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let mut family_of = FxHashMap::default();
        for (index, family) in families.iter().enumerate() {
            for &decl in &family.interfaces {
                family_of.insert(decl, index);
            }
        }
        Builder {
            decls,
            facts,
            names,
            families,
            family_of,
            abstract_state: FxHashMap::default(),
            arena: NodeArena::new(),
            registry: TypeRegistry::new(),
            support_shapes: Vec::new(),
            sink,
            errors: 0,
            sig_pool: SignaturePool::new(),
        }
    }

    /// Register every declared family, then every unclaimed marker
    /// interface. Best-effort: failures are reported and skipped so the
    /// rest of the run can surface its own errors.
    pub fn build(&mut self) {
        debug!(families = self.families.len(), "registering declared families");
        for index in 0..self.families.len() {
            if self.register_family(index).is_err() {
                trace!(family = index, "family registration failed");
            }
        }
        let decls = self.decls;
        let markers: Vec<DeclId> = decls
            .markers()
            .filter(|marker| !self.family_of.contains_key(marker))
            .collect();
        for marker in markers {
            let _ = self.resolve_abstract(marker);
        }
    }

    /// Register one declared-type descriptor, returning the projection of
    /// the built pair matching the descriptor's nullability.
    pub fn register(&mut self, declared: &TypeRef) -> Result<NodeId, BuildError> {
        if self.registry.is_locked() {
            return Err(self.fail(
                BuildError::RegistryLocked,
                "registration attempted after the type system was finalized",
            ));
        }
        let id = self.register_desc(&declared.desc)?;
        // Unknown nullability is permissive-nullable, per the build-wide
        // policy in typegraph-decl::facts.
        Ok(match declared.nullability {
            Nullability::NonNullable => id.non_nullable(),
            Nullability::Nullable | Nullability::Unknown => id.nullable(),
        })
    }

    fn register_desc(&mut self, desc: &TypeDesc) -> Result<NodeId, BuildError> {
        match desc {
            TypeDesc::Any => Ok(self.register_top_type()),
            TypeDesc::Basic(kind) => Ok(self.register_basic(*kind)),
            TypeDesc::Decl(decl) => self.register_decl_node(*decl),
            TypeDesc::Tuple(elems) => self.register_tuple(elems),
            TypeDesc::Array(item) => self.register_array(item),
            TypeDesc::List(mode, item) => self.register_list(*mode, item),
            TypeDesc::Set(mode, item) => self.register_set(*mode, item),
            TypeDesc::Dictionary(mode, key, value) => self.register_dictionary(*mode, key, value),
            TypeDesc::Union(members, can_extend) => self.resolve_union(members, *can_extend),
        }
    }

    fn register_decl_node(&mut self, decl: DeclId) -> Result<NodeId, BuildError> {
        if let Some(id) = self.registry.lookup_decl(decl) {
            return Ok(id);
        }
        let kind = self.decls.get(decl).kind;
        match kind {
            DeclKind::Record => self.register_record(decl),
            DeclKind::Enum => self.register_enum(decl),
            DeclKind::Marker => self.resolve_abstract(decl),
            DeclKind::Interface => match self.family_of.get(&decl).copied() {
                Some(index) => {
                    self.register_family(index)?;
                    self.registry.lookup_decl(decl).ok_or_else(|| {
                        BuildError::UnsupportedShape("family registration incomplete".into())
                    })
                }
                None => {
                    let name = self.display_decl(decl);
                    Err(self.fail(
                        BuildError::UnsupportedShape(name.clone()),
                        format!("interface {name} is not part of any declared family"),
                    ))
                }
            },
        }
    }

    /// The top type. Nothing can be assumed about it, so it has no
    /// synthesizable default and is never final.
    pub(crate) fn register_top_type(&mut self) -> NodeId {
        let key = TypeKey::Any;
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::POLYMORPHIC)
            .with_default(DefaultInfo::Disallowed);
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        let pair = self.arena.pair_mut(id);
        pair.oblivious = Some(id);
        pair.regular = Some(Some(id));
        id
    }

    /// Basic value shapes: leaf pairs with a built-in zero default.
    pub(crate) fn register_basic(&mut self, kind: BasicKind) -> NodeId {
        let key = TypeKey::Basic(kind);
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::FINAL | NodeFlags::READONLY_COMPLIANT | NodeFlags::HASH_SAFE)
            .with_default(DefaultInfo::Value(SynthDefault::Literal(
                kind.default_value(),
            )));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        let pair = self.arena.pair_mut(id);
        pair.oblivious = Some(id);
        pair.regular = Some(Some(id));
        id
    }

    /// Enums require an integral underlying type and a resolvable external
    /// name; both are registration errors, not warnings.
    pub(crate) fn register_enum(&mut self, decl: DeclId) -> Result<NodeId, BuildError> {
        let key = TypeKey::Enum(decl);
        if let Some(id) = self.registry.lookup_key(&key) {
            return Ok(id);
        }
        let decls = self.decls;
        let info = decls.get(decl);
        let name = self.display_decl(decl);

        let underlying = match info.enum_underlying {
            Some(underlying) if underlying.is_integer() => underlying,
            _ => {
                return Err(self.fail(
                    BuildError::EnumUnderlyingNotInteger(decl),
                    format!("enum {name} must have an integer underlying type"),
                ));
            }
        };
        if info.external_name.is_none() {
            return Err(self.fail(
                BuildError::EnumMissingExternalName(decl),
                format!("external name lookup failed for enum {name}"),
            ));
        }
        self.register_basic(underlying);

        let default = match info.enum_members.first() {
            Some((_, value)) => typegraph_decl::DefaultValue::EnumMember(*value),
            None => typegraph_decl::DefaultValue::EnumMember(0),
        };
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::FINAL | NodeFlags::READONLY_COMPLIANT | NodeFlags::HASH_SAFE)
            .with_decl(decl, info.name)
            .with_default(DefaultInfo::Value(SynthDefault::Literal(default)));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.registry.insert_decl(decl, id);
        let pair = self.arena.pair_mut(id);
        pair.oblivious = Some(id);
        pair.regular = Some(Some(id));
        Ok(id)
    }

    // -----------------------------------------------------------------
    // Diagnostics plumbing
    // -----------------------------------------------------------------

    /// Report an error diagnostic and hand the error back for `?`.
    pub(crate) fn fail(&mut self, error: BuildError, message: impl Into<String>) -> BuildError {
        self.errors += 1;
        self.sink.report(Diagnostic::error(error.code(), message));
        error
    }

    /// Report an error diagnostic with a graph path attached.
    pub(crate) fn fail_at(
        &mut self,
        error: BuildError,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> BuildError {
        self.errors += 1;
        self.sink
            .report(Diagnostic::error(error.code(), message).with_path(path));
        error
    }

    pub(crate) fn warn(&mut self, code: u32, message: impl Into<String>) {
        self.sink.report(Diagnostic::warning(code, message));
    }

    /// Declared name of a declaration, for messages.
    pub(crate) fn display_decl(&self, decl: DeclId) -> String {
        self.names.resolve_str(self.decls.get(decl).name).to_string()
    }

    /// Structural signature of a node, for messages and ordering.
    pub(crate) fn signature(&self, id: NodeId) -> String {
        signature_string(&self.arena, self.names, id)
    }

    // -----------------------------------------------------------------
    // Introspection used by tests and the finalize step
    // -----------------------------------------------------------------

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;
