//! Tests for CST construction and the lossless round-trip property, built
//! directly against the real grammar rather than the builder primitives
//! already covered in `builder.rs`.

use super::ast::{ClassDecl, CompilationUnit, TypeDecl};
use super::*;

#[test]
fn parse_round_trips_source_byte_for_byte() {
    let source = "namespace Foo {\n    class Bar : UdonSharpBehaviour {\n        // a comment\n        public void Baz() {}\n    }\n}\n";
    let (root, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    assert_eq!(root.text().to_string(), source);
}

#[test]
fn parse_finds_class_decl_inside_namespace() {
    let source = "namespace Foo {\n    class Bar : UdonSharpBehaviour {}\n}\n";
    let (root, _) = parse(source);
    assert_eq!(root.kind(), UshSyntaxKind::CompilationUnit);

    let unit = CompilationUnit::cast(root).expect("cast to CompilationUnit");
    let types = unit.all_type_decls();
    assert_eq!(types.len(), 1);
    assert!(matches!(types[0], TypeDecl::Class(_)));
    assert_eq!(types[0].name().as_deref(), Some("Bar"));
}

#[test]
fn base_list_extends_or_implements_matches_by_simple_name() {
    let source = "class Bar : UdonSharpBehaviour {}\n";
    let (root, _) = parse(source);
    let unit = CompilationUnit::cast(root).expect("cast to CompilationUnit");
    let types = unit.all_type_decls();
    let class = &types[0];
    assert!(class.extends_or_implements("UdonSharpBehaviour"));
    assert!(!class.extends_or_implements("SomethingElse"));
}

#[test]
fn field_decl_exposes_attribute_lists() {
    let source = "class Bar : UdonSharpBehaviour {\n    [UdonSynced] public int Health;\n}\n";
    let (root, _) = parse(source);
    let unit = CompilationUnit::cast(root).expect("cast to CompilationUnit");
    let TypeDecl::Class(class) = &unit.all_type_decls()[0] else {
        panic!("expected class");
    };
    let field = class
        .syntax()
        .descendants()
        .find_map(crate::cst::ast::FieldDecl::cast)
        .expect("field declaration");
    assert!(field.has_attribute("UdonSynced"));
}

#[test]
fn method_decl_exposes_name_and_modifiers() {
    let source = "class Bar : UdonSharpBehaviour {\n    public override void OnPlayerJoined(VRCPlayerApi player) {}\n}\n";
    let (root, _) = parse(source);
    let unit = CompilationUnit::cast(root).expect("cast to CompilationUnit");
    let TypeDecl::Class(class) = &unit.all_type_decls()[0] else {
        panic!("expected class");
    };
    let method = class
        .syntax()
        .descendants()
        .find_map(crate::cst::ast::MethodDecl::cast)
        .expect("method declaration");
    assert_eq!(method.name().as_deref(), Some("OnPlayerJoined"));
    let modifiers = method.modifiers();
    assert!(modifiers.iter().any(|m| m == "public"));
    assert!(modifiers.iter().any(|m| m == "override"));
}

#[test]
fn class_cast_rejects_non_class_node() {
    let source = "struct Bar {}\n";
    let (root, _) = parse(source);
    let unit = CompilationUnit::cast(root).expect("cast to CompilationUnit");
    let struct_node = unit.all_type_decls()[0].syntax().clone();
    assert!(ClassDecl::cast(struct_node).is_none());
}
