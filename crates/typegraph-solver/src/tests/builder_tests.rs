use crate::builder::Builder;
use crate::node::{DefaultInfo, SynthDefault, TypeKind};
use typegraph_common::{DiagnosticCollector, Interner, codes};
use typegraph_decl::{
    BasicKind, DeclInfo, DeclStore, DefaultValue, FamilyDecl, Nullability, TypeRef,
};

#[test]
fn test_basic_registration_deduplicates() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let first = builder.register(&TypeRef::basic(BasicKind::I32)).unwrap();
    let second = builder.register(&TypeRef::basic(BasicKind::I32)).unwrap();
    let other = builder.register(&TypeRef::basic(BasicKind::I64)).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(builder.registry().len(), 2);
}

#[test]
fn test_nullability_projects_onto_the_pair() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let plain = builder.register(&TypeRef::basic(BasicKind::Str)).unwrap();
    let nullable = builder
        .register(&TypeRef::nullable(typegraph_decl::TypeDesc::Basic(
            BasicKind::Str,
        )))
        .unwrap();

    assert!(!plain.is_nullable());
    assert!(nullable.is_nullable());
    assert_eq!(nullable.non_nullable(), plain);
    // One pair, two variants.
    assert_eq!(builder.registry().len(), 1);
}

#[test]
fn test_unknown_nullability_is_treated_as_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let id = builder
        .register(&TypeRef::basic(BasicKind::Bool).with_nullability(Nullability::Unknown))
        .unwrap();
    assert!(id.is_nullable());
}

#[test]
fn test_basic_nodes_have_zero_defaults_and_full_flags() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let id = builder.register(&TypeRef::basic(BasicKind::I32)).unwrap();
    let node = builder.arena().node(id);
    assert!(node.is_final());
    assert!(node.is_readonly_compliant());
    assert!(node.is_hash_safe());
    assert_eq!(
        node.default(),
        DefaultInfo::Value(SynthDefault::Literal(DefaultValue::Int(0)))
    );
    assert!(node.is_oblivious());
}

#[test]
fn test_enum_registers_over_its_underlying_type() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let color = decls.register(DeclInfo::enumeration(
        names.intern("Color"),
        BasicKind::U8,
        vec![(names.intern("Red"), 0), (names.intern("Green"), 1)],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let id = builder.register(&TypeRef::decl(color)).unwrap();
    let node = builder.arena().node(id);
    assert_eq!(node.kind(), TypeKind::Enum);
    assert_eq!(
        node.default(),
        DefaultInfo::Value(SynthDefault::Literal(DefaultValue::EnumMember(0)))
    );
    // The underlying basic type was registered alongside.
    assert!(
        builder
            .registry()
            .lookup_key(&crate::node::TypeKey::Basic(BasicKind::U8))
            .is_some()
    );
}

#[test]
fn test_enum_with_non_integer_underlying_is_rejected() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let bad = decls.register(DeclInfo::enumeration(
        names.intern("Weights"),
        BasicKind::F64,
        vec![(names.intern("Light"), 0)],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(bad)).is_err());
    assert_eq!(builder.error_count(), 1);
    assert!(sink.find(codes::ENUM_UNDERLYING_NOT_INTEGER).is_some());
}

#[test]
fn test_enum_without_external_name_is_rejected() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let bad = decls.register(
        DeclInfo::enumeration(names.intern("Hidden"), BasicKind::I32, Vec::new())
            .with_external_name(None),
    );
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(bad)).is_err());
    assert!(sink.find(codes::ENUM_MISSING_EXTERNAL_NAME).is_some());
}

#[test]
fn test_interface_outside_any_family_is_unsupported() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let stray = decls.register(DeclInfo::interface(names.intern("IStray"), Vec::new()));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    assert!(builder.register(&TypeRef::decl(stray)).is_err());
    assert!(sink.find(codes::UNSUPPORTED_SHAPE).is_some());
}

#[test]
fn test_build_registers_every_family() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let a = decls.register(DeclInfo::interface(names.intern("IA"), Vec::new()));
    let b = decls.register(DeclInfo::interface(names.intern("IB"), Vec::new()));
    let families = vec![FamilyDecl::new(vec![a]), FamilyDecl::new(vec![b])];
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, families, &mut sink);

    builder.build();

    assert!(builder.registry().lookup_decl(a).is_some());
    assert!(builder.registry().lookup_decl(b).is_some());
    assert_eq!(builder.error_count(), 0);
}

#[test]
fn test_build_resolves_unclaimed_markers() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let marker = decls.register(DeclInfo::marker(names.intern("ITagged")));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    builder.build();

    let id = builder.registry().lookup_decl(marker).unwrap();
    assert_eq!(builder.arena().node(id).kind(), TypeKind::AbstractInterface);
    assert_eq!(builder.error_count(), 0);
    // No implementing family: reported as a warning, not an error.
    assert!(sink.find(codes::IMPLEMENTATIONLESS_ABSTRACT).is_some());
}
