//! Build-time canonical type-system construction.
//!
//! This is the facade crate: it re-exports the declared-type input model,
//! the diagnostic model, and the solver, and provides [`build_type_system`]
//! as the one-call entry point.
//!
//! ```
//! use typegraph::{
//!     BasicKind, DeclInfo, DeclStore, DiagnosticCollector, FamilyDecl, Interner, MemberDecl,
//!     MemberFacts, TypeRef, build_type_system,
//! };
//!
//! let mut names = Interner::new();
//! let mut decls = DeclStore::new();
//! let point = decls.register(DeclInfo::interface(
//!     names.intern("IPoint"),
//!     vec![
//!         MemberDecl::new(names.intern("x"), MemberFacts::new(TypeRef::basic(BasicKind::F64))),
//!         MemberDecl::new(names.intern("y"), MemberFacts::new(TypeRef::basic(BasicKind::F64))),
//!     ],
//! ));
//!
//! let mut sink = DiagnosticCollector::new();
//! let system = build_type_system(&decls, vec![FamilyDecl::new(vec![point])], &names, &mut sink)
//!     .expect("build succeeds");
//! assert!(system.oblivious_for(point).is_some());
//! ```

pub use typegraph_common::{
    Atom, Diagnostic, DiagnosticCollector, DiagnosticSink, Interner, Severity, codes,
};
pub use typegraph_decl::{
    AccessKind, BasicKind, CollectionMode, DeclId, DeclInfo, DeclKind, DeclStore, DefaultValue,
    FactsProvider, FamilyDecl, MemberDecl, MemberFacts, Nullability, TupleElem, TypeDesc, TypeRef,
    resolve_nullability,
};
pub use typegraph_solver::{
    BuildError, Builder, DefaultInfo, Field, FinalizeError, Node, NodeArena, NodeFlags, NodeId,
    SupportShape, SynthDefault, TypeKey, TypeKind, TypeRegistry, TypeSystem, TypeSystemStats,
    signature_string,
};

/// Build, check, and finalize a type system in one call.
///
/// Registers every declared family (and unclaimed marker), then finalizes.
/// All diagnostics go through `sink`; the `Err` case only carries the error
/// count.
pub fn build_type_system(
    decls: &DeclStore,
    families: Vec<FamilyDecl>,
    names: &Interner,
    sink: &mut dyn DiagnosticSink,
) -> Result<TypeSystem, FinalizeError> {
    let mut builder = Builder::new(decls, decls, names, families, sink);
    builder.build();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_build_type_system_smoke() {
        init_tracing();
        let mut names = Interner::new();
        let mut decls = DeclStore::new();
        let order = decls.register(DeclInfo::interface(
            names.intern("IOrder"),
            vec![MemberDecl::new(
                names.intern("total"),
                MemberFacts::new(TypeRef::basic(BasicKind::Decimal)),
            )],
        ));

        let mut sink = DiagnosticCollector::new();
        let system = build_type_system(&decls, vec![FamilyDecl::new(vec![order])], &names, &mut sink)
            .expect("single-interface build succeeds");

        assert!(!sink.has_errors());
        let node = system
            .oblivious_for(order)
            .expect("declared identity mapped");
        assert_eq!(system.node(node).kind(), TypeKind::PrimaryInterface);
    }
}
