use crate::builder::Builder;
use crate::node::{DefaultInfo, TypeKey, TypeKind};
use typegraph_common::{DiagnosticCollector, Interner, codes};
use typegraph_decl::{
    BasicKind, CollectionMode, DeclInfo, DeclStore, FamilyDecl, MemberDecl, MemberFacts, TypeDesc,
    TypeRef,
};

#[test]
fn test_list_identity_distinguishes_item_nullability() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let plain = builder
        .register(&TypeRef::list(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32),
        ))
        .unwrap();
    let nullable_item = builder
        .register(&TypeRef::list(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32).as_nullable(),
        ))
        .unwrap();
    let again = builder
        .register(&TypeRef::list(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32),
        ))
        .unwrap();

    assert_ne!(plain, nullable_item);
    assert_eq!(plain, again);
}

#[test]
fn test_list_oblivious_makes_the_item_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let plain = builder
        .register(&TypeRef::list(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32),
        ))
        .unwrap();
    let oblivious = builder.arena().node(plain).oblivious().unwrap();
    assert_ne!(plain, oblivious);
    match builder.arena().node(oblivious).key() {
        TypeKey::List(CollectionMode::Concrete, item) => assert!(item.is_nullable()),
        other => panic!("expected concrete list, got {other:?}"),
    }
    // The oblivious form is its own fixed point.
    assert!(builder.arena().node(oblivious).is_oblivious());
}

#[test]
fn test_view_modes_canonicalize_onto_the_concrete_list() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let view = builder
        .register(&TypeRef::list(
            CollectionMode::Interface,
            TypeRef::basic(BasicKind::Str),
        ))
        .unwrap();
    let concrete = builder
        .register(&TypeRef::list(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::Str),
        ))
        .unwrap();

    assert_ne!(view, concrete);
    assert!(builder.arena().node(view).is_polymorphic());
    assert!(builder.arena().node(concrete).is_final());
    assert_eq!(builder.arena().node(view).regular(), Some(Some(concrete)));
    // Both go oblivious onto the same concrete nullable-item list.
    assert_eq!(
        builder.arena().node(view).oblivious(),
        builder.arena().node(concrete).oblivious()
    );
}

#[test]
fn test_readonly_view_over_the_top_type_has_no_regular_form() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let view = builder
        .register(&TypeRef::list(
            CollectionMode::ReadOnly,
            TypeRef::new(TypeDesc::Any),
        ))
        .unwrap();

    assert_eq!(builder.arena().node(view).regular(), Some(None));
    assert_eq!(builder.arena().node(view).default(), DefaultInfo::Disallowed);
}

#[test]
fn test_array_oblivious_item_goes_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let array = builder
        .register(&TypeRef::array(TypeRef::basic(BasicKind::U8)))
        .unwrap();
    let oblivious = builder.arena().node(array).oblivious().unwrap();
    match builder.arena().node(oblivious).key() {
        TypeKey::Array(item) => assert!(item.is_nullable()),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn test_set_rejects_items_that_are_not_hash_safe() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let holder = decls.register(DeclInfo::record(
        names.intern("Holder"),
        vec![MemberDecl::new(
            names.intern("value"),
            MemberFacts::new(TypeRef::basic(BasicKind::I32)),
        )],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    // Records are final but mutable: not hash-safe.
    let result = builder.register(&TypeRef::set(
        CollectionMode::Concrete,
        TypeRef::decl(holder),
    ));
    assert!(result.is_err());
    let diagnostic = sink.find(codes::SET_ITEM_NOT_HASH_SAFE).unwrap();
    assert!(diagnostic.message.contains("hash-safe"));
    assert!(diagnostic.message.contains("read-only"));
}

#[test]
fn test_set_oblivious_item_goes_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let plain = builder
        .register(&TypeRef::set(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32),
        ))
        .unwrap();
    let nullable_item = builder
        .register(&TypeRef::set(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::I32).as_nullable(),
        ))
        .unwrap();

    // Like lists, sets canonicalize onto the nullable-item shape.
    assert_ne!(plain, nullable_item);
    assert_eq!(
        builder.arena().node(plain).oblivious(),
        Some(nullable_item)
    );
    assert!(builder.arena().node(nullable_item).is_oblivious());
}

#[test]
fn test_dictionary_key_must_be_non_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let result = builder.register(&TypeRef::dictionary(
        CollectionMode::Concrete,
        TypeRef::basic(BasicKind::Str).as_nullable(),
        TypeRef::basic(BasicKind::I32),
    ));
    assert!(result.is_err());
    assert!(sink.find(codes::DICTIONARY_KEY_NULLABLE).is_some());
}

#[test]
fn test_dictionary_key_must_be_readonly_compliant() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let holder = decls.register(DeclInfo::record(
        names.intern("Holder"),
        vec![MemberDecl::new(
            names.intern("value"),
            MemberFacts::new(TypeRef::basic(BasicKind::I32)),
        )],
    ));
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let result = builder.register(&TypeRef::dictionary(
        CollectionMode::Concrete,
        TypeRef::decl(holder),
        TypeRef::basic(BasicKind::I32),
    ));
    assert!(result.is_err());
    assert!(sink.find(codes::DICTIONARY_KEY_NOT_READONLY).is_some());
}

#[test]
fn test_dictionary_oblivious_keeps_the_key_non_nullable() {
    let names = Interner::new();
    let decls = DeclStore::new();
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, Vec::new(), &mut sink);

    let dict = builder
        .register(&TypeRef::dictionary(
            CollectionMode::Concrete,
            TypeRef::basic(BasicKind::Str),
            TypeRef::basic(BasicKind::I32),
        ))
        .unwrap();
    let oblivious = builder.arena().node(dict).oblivious().unwrap();
    match builder.arena().node(oblivious).key() {
        TypeKey::Dictionary(CollectionMode::Concrete, key, value) => {
            assert!(!key.is_nullable());
            assert!(value.is_nullable());
        }
        other => panic!("expected dictionary, got {other:?}"),
    }
}

#[test]
fn test_interface_view_over_interface_item_records_a_support_shape() {
    let mut names = Interner::new();
    let mut decls = DeclStore::new();
    let animal = decls.register(DeclInfo::interface(names.intern("IAnimal"), Vec::new()));
    let families = vec![FamilyDecl::new(vec![animal])];
    let mut sink = DiagnosticCollector::new();
    let mut builder = Builder::new(&decls, &decls, &names, families, &mut sink);
    builder.build();

    let view = builder
        .register(&TypeRef::list(
            CollectionMode::Interface,
            TypeRef::decl(animal),
        ))
        .unwrap();
    let system = builder.finish().expect("no errors recorded");
    let shapes = system.support_shapes();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].view, view);
    assert_eq!(
        system.node(shapes[0].item).kind(),
        TypeKind::PrimaryInterface
    );
}
