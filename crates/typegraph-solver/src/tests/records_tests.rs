use crate::builder::Builder;
use crate::node::{TypeKey, TypeKind};
use typegraph_common::{DiagnosticCollector, Interner, codes};
use typegraph_decl::{
    AccessKind, BasicKind, DeclInfo, DeclStore, MemberDecl, MemberFacts, Nullability, TupleElem,
    TypeRef,
};

fn member(names: &mut Interner, name: &str, ty: TypeRef) -> MemberDecl {
    MemberDecl::new(names.intern(name), MemberFacts::new(ty))
}

#[test]
fn test_record_registers_fields_in_declaration_order() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let point = decls.register(DeclInfo::record(
        names.intern("Point"),
        vec![
            member(&mut names, "x", TypeRef::basic(BasicKind::F64)),
            member(&mut names, "y", TypeRef::basic(BasicKind::F64)),
        ],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let id = builder.register(&TypeRef::decl(point)).unwrap();
    let node = builder.arena().node(id);
    assert_eq!(node.kind(), TypeKind::NamedRecord);
    assert!(node.is_final());
    assert_eq!(node.fields().len(), 2);
    assert_eq!(node.fields()[0].index, 0);
    assert_eq!(node.fields()[1].index, 1);
    assert_eq!(node.fields()[0].ty, node.fields()[1].ty);

    // Registering the declared identity again is a registry hit.
    let again = builder.register(&TypeRef::decl(point)).unwrap();
    assert_eq!(id, again);
}

#[test]
fn test_record_with_two_constructors_is_rejected() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let bad = decls.register(
        DeclInfo::record(names.intern("Bad"), Vec::new()).with_constructor_count(2),
    );
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(bad)).is_err());
    assert!(sink.find(codes::MULTIPLE_CONSTRUCTORS).is_some());
}

#[test]
fn test_record_with_readonly_member_is_rejected() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let frozen = names.intern("frozen");
    let bad = decls.register(DeclInfo::record(
        names.intern("Frozen"),
        vec![MemberDecl::new(
            frozen,
            MemberFacts::new(TypeRef::basic(BasicKind::I32))
                .with_access(AccessKind::ReadOnlyAbstract),
        )],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(bad)).is_err());
    assert!(sink.find(codes::MUST_BE_FULLY_MUTABLE).is_some());
}

#[test]
fn test_member_nullability_disagreement_is_rejected() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let value = names.intern("value");
    let bad = decls.register(DeclInfo::record(
        names.intern("Torn"),
        vec![MemberDecl::new(
            value,
            MemberFacts::new(TypeRef::basic(BasicKind::Str))
                .with_read_nullability(Nullability::Nullable)
                .with_write_nullability(Nullability::NonNullable),
        )],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(bad)).is_err());
    assert!(sink.find(codes::NULLABILITY_MISMATCH).is_some());
}

#[test]
fn test_self_referential_record_terminates_through_nullable_field() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let next = names.intern("next");
    // Node registered below gets DeclId(0); the member references it.
    let node_decl = typegraph_decl::DeclId(0);
    let registered = decls.register(DeclInfo::record(
        names.intern("Node"),
        vec![MemberDecl::new(
            next,
            MemberFacts::new(TypeRef::decl(node_decl).as_nullable()),
        )],
    ));
    assert_eq!(registered, node_decl);
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let id = builder.register(&TypeRef::decl(node_decl)).unwrap();
    let node = builder.arena().node(id);
    assert_eq!(node.fields().len(), 1);
    assert_eq!(node.fields()[0].ty, id.nullable());
    assert_eq!(builder.error_count(), 0);
}

#[test]
fn test_tuple_identity_includes_names_and_defaults() {
    let mut names = Interner::new();
    let decls = DeclStore::new();
    let x = names.intern("x");
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let named = builder
        .register(&TypeRef::tuple(vec![
            TupleElem::named(x, TypeRef::basic(BasicKind::I32)),
            TupleElem::unnamed(TypeRef::basic(BasicKind::Str)),
        ]))
        .unwrap();
    let unnamed = builder
        .register(&TypeRef::tuple(vec![
            TupleElem::unnamed(TypeRef::basic(BasicKind::I32)),
            TupleElem::unnamed(TypeRef::basic(BasicKind::Str)),
        ]))
        .unwrap();

    assert_ne!(named, unnamed);
    // Name erasure makes them share one oblivious node.
    let named_node = builder.arena().node(named);
    let unnamed_node = builder.arena().node(unnamed);
    assert_eq!(named_node.oblivious(), Some(unnamed));
    assert!(unnamed_node.is_oblivious());
}

#[test]
fn test_tuple_flags_require_every_field_to_comply() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let safe = builder
        .register(&TypeRef::tuple(vec![
            TupleElem::unnamed(TypeRef::basic(BasicKind::I32)),
            TupleElem::unnamed(TypeRef::basic(BasicKind::Str)),
        ]))
        .unwrap();
    assert!(builder.arena().node(safe).is_hash_safe());

    // An array field is neither read-only compliant nor hash-safe.
    let unsafe_tuple = builder
        .register(&TypeRef::tuple(vec![TupleElem::unnamed(TypeRef::array(
            TypeRef::basic(BasicKind::I32),
        ))]))
        .unwrap();
    assert!(!builder.arena().node(unsafe_tuple).is_hash_safe());
    assert!(!builder.arena().node(unsafe_tuple).is_readonly_compliant());
}

#[test]
fn test_trailing_tuple_continuation_is_flattened() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let mut elems: Vec<TupleElem> = (0..7)
        .map(|_| TupleElem::unnamed(TypeRef::basic(BasicKind::I32)))
        .collect();
    elems.push(TupleElem::unnamed(TypeRef::tuple(vec![
        TupleElem::unnamed(TypeRef::basic(BasicKind::Str)),
        TupleElem::unnamed(TypeRef::basic(BasicKind::Bool)),
    ])));

    let id = builder.register(&TypeRef::tuple(elems)).unwrap();
    let node = builder.arena().node(id);
    assert_eq!(node.fields().len(), 9);
    match node.key() {
        TypeKey::AnonymousRecord(fields) => assert_eq!(fields.len(), 9),
        other => panic!("expected anonymous record, got {other:?}"),
    }
}
