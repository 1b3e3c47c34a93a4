//! Language constraints (USH0022-0039): C# surface area that the Udon VM
//! cannot execute, or that this toolchain otherwise disallows script authors
//! from relying on.

use ush_core::cst::ast::{
    descendants, ConditionalAccessExpr, ElementAccessExpr, LocalFunctionDecl, Member, TypeDecl,
    TypeRef, TypeofExpr,
};
use ush_core::cst::{UshSyntaxKind, UshSyntaxNode};
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

fn direct_comma_count(node: &UshSyntaxNode) -> usize {
    node.children_with_tokens()
        .filter_map(|el| el.into_token())
        .filter(|t| t.kind() == UshSyntaxKind::Comma)
        .count()
}

fn is_nullable_value_type(type_ref: &TypeRef) -> bool {
    let has_suffix = type_ref
        .syntax()
        .children()
        .any(|n| n.kind() == UshSyntaxKind::NullableTypeSuffix);
    has_suffix || type_ref.simple_name().as_deref() == Some("Nullable")
}

fn has_modifier(modifiers: &[String], name: &str) -> bool {
    modifiers.iter().any(|m| m == name)
}

/// A base-list entry resolving to another declaration in the same file that
/// is itself an interface, or a name following the `I<Upper>` convention, is
/// treated as an interface implementation. There is no cross-file symbol
/// table to check against a real base type list.
fn base_list_interfaces(type_decl: &TypeDecl, all: &[TypeDecl]) -> Vec<String> {
    let Some(base_list) = type_decl.base_list() else {
        return Vec::new();
    };
    base_list
        .syntax()
        .children()
        .filter_map(TypeRef::cast)
        .filter_map(|t| t.simple_name())
        .filter(|name| {
            if let Some(found) = all.iter().find(|td| td.name().as_deref() == Some(name.as_str())) {
                matches!(found, TypeDecl::Interface(_))
            } else {
                name != "UdonSharpBehaviour"
                    && name.len() > 1
                    && name.starts_with('I')
                    && name.chars().nth(1).is_some_and(|c| c.is_ascii_uppercase())
            }
        })
        .collect()
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let root = ctx.root();
    let all_types = util::file_type_decls(root);

    for type_decl in &all_types {
        if !util::is_udonsharp_script(type_decl) {
            continue;
        }

        for interface_name in base_list_interfaces(type_decl, &all_types) {
            out.push(ctx.diagnostic(
                "USH0030",
                format!("Implementing interface '{interface_name}' is not supported."),
                type_decl.syntax(),
            ));
        }

        let base_method_names: std::collections::HashSet<String> = type_decl
            .base_list()
            .into_iter()
            .flat_map(|bl| bl.syntax().children().filter_map(TypeRef::cast).collect::<Vec<_>>())
            .filter_map(|t| t.simple_name())
            .filter_map(|name| all_types.iter().find(|td| td.name().as_deref() == Some(name.as_str())).cloned())
            .flat_map(|base| base.members())
            .filter_map(|m| m.as_method().and_then(|mm| mm.name()))
            .collect();

        for member in type_decl.members() {
            match &member {
                Member::Nested(_) => {
                    out.push(ctx.diagnostic("USH0027", "Nested type declarations are not supported.", member.syntax()));
                }
                Member::Constructor(ctor) => {
                    out.push(ctx.diagnostic("USH0028", "User-defined constructors are not supported.", ctor.syntax()));
                }
                Member::Method(method) => {
                    let name = method.name().unwrap_or_default();
                    let modifiers = method.modifiers();

                    if has_modifier(&modifiers, "static") {
                        out.push(ctx.diagnostic("USH0034", format!("Static method '{name}' is not supported."), method.syntax()));
                    }
                    if has_modifier(&modifiers, "partial") {
                        out.push(ctx.diagnostic("USH0035", format!("Partial method '{name}' is not supported."), method.syntax()));
                    }
                    if method.syntax().children().any(|n| n.kind() == UshSyntaxKind::GenericArgList) {
                        out.push(ctx.diagnostic("USH0029", format!("Generic method '{name}' is not supported."), method.syntax()));
                    }
                    if base_method_names.contains(&name) && !has_modifier(&modifiers, "override") {
                        out.push(ctx.diagnostic(
                            "USH0031",
                            format!("'{name}' hides an inherited method without 'override'."),
                            method.syntax(),
                        ));
                    }

                    for local_fn in descendants(method.syntax(), LocalFunctionDecl::cast) {
                        out.push(ctx.diagnostic("USH0026", "Local function declarations are not supported.", local_fn.syntax()));
                    }
                }
                Member::Field(field) => {
                    if has_modifier(&field.modifiers(), "static") {
                        let name = field.declarators().next().and_then(|d| d.name()).unwrap_or_default();
                        out.push(ctx.diagnostic("USH0034", format!("Static field '{name}' is not supported."), field.syntax()));
                    }
                }
                Member::Property(prop) => {
                    if has_modifier(&prop.modifiers(), "static") {
                        let name = prop.name().unwrap_or_default();
                        out.push(ctx.diagnostic("USH0034", format!("Static property '{name}' is not supported."), prop.syntax()));
                    }
                }
            }
        }

        for type_ref in descendants(type_decl.syntax(), TypeRef::cast) {
            if is_nullable_value_type(&type_ref) {
                out.push(ctx.diagnostic(
                    "USH0022",
                    format!("Nullable type '{}' is not supported.", type_ref.full_text()),
                    type_ref.syntax(),
                ));
            }
            let multi_dim = type_ref
                .syntax()
                .children()
                .filter(|n| n.kind() == UshSyntaxKind::ArrayTypeSuffix)
                .any(|suffix| direct_comma_count(&suffix) > 0);
            if multi_dim {
                out.push(ctx.diagnostic("USH0024", "Multi-dimensional arrays are not supported.", type_ref.syntax()));
            }
        }

        for node in type_decl.syntax().descendants() {
            match node.kind() {
                UshSyntaxKind::ObjectCreationExpr | UshSyntaxKind::ArrayCreationExpr => {
                    if direct_comma_count(&node) > 0 {
                        out.push(ctx.diagnostic("USH0024", "Multi-dimensional array creation is not supported.", &node));
                    }
                }
                UshSyntaxKind::GotoStatement => {
                    out.push(ctx.diagnostic("USH0036", "'goto' statements are not supported.", &node));
                }
                UshSyntaxKind::LabeledStatement => {
                    out.push(ctx.diagnostic("USH0037", "Labeled statements are not supported.", &node));
                }
                UshSyntaxKind::GotoCaseStatement => {
                    out.push(ctx.diagnostic("USH0038", "'goto case' statements are not supported.", &node));
                }
                UshSyntaxKind::GotoDefaultStatement => {
                    out.push(ctx.diagnostic("USH0039", "'goto default' statements are not supported.", &node));
                }
                _ => {}
            }
        }

        for access in descendants(type_decl.syntax(), ConditionalAccessExpr::cast) {
            out.push(ctx.diagnostic("USH0023", "Null-conditional access ('?.') is not supported.", access.syntax()));
        }

        for element_access in descendants(type_decl.syntax(), ElementAccessExpr::cast) {
            if element_access.args().len() > 1 {
                out.push(ctx.diagnostic("USH0025", "Multi-argument element access is not supported.", element_access.syntax()));
            }
        }

        for typeof_expr in descendants(type_decl.syntax(), TypeofExpr::cast) {
            let Some(type_ref) = typeof_expr.type_ref() else { continue };
            let Some(name) = type_ref.simple_name() else { continue };
            if all_types.iter().any(|td| td.name().as_deref() == Some(name.as_str()) && util::is_udonsharp_script(td)) {
                out.push(ctx.diagnostic(
                    "USH0033",
                    format!("'typeof({name})' is not supported for UdonSharp script types."),
                    typeof_expr.syntax(),
                ));
            }
        }

        for node in type_decl.syntax().descendants() {
            if matches!(node.kind(), UshSyntaxKind::ObjectInitializer | UshSyntaxKind::CollectionInitializer) {
                out.push(ctx.diagnostic("USH0032", "Object and collection initializers are not supported.", &node));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ush_core::settings::Settings;
    use ush_core::workspace::{CompilationContext, Document};

    fn analyze(source: &str) -> Vec<Diagnostic> {
        let document = Document::new("file:///Test.cs", source);
        let settings = Settings::default();
        let compilation = CompilationContext::build(&settings, std::path::Path::new("."));
        let ctx = RuleContext::new(&document, &settings, &compilation);
        run(&ctx)
    }

    #[test]
    fn nullable_and_conditional_access_report_0022_0023() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    int? score;\n    void Foo() {\n        var x = gameObject?.transform;\n    }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0022"));
        assert!(ids.contains(&"USH0023"));
    }

    #[test]
    fn goto_and_label_report_0036_0037() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo() {\n    start:\n        goto start;\n    }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0036"));
        assert!(ids.contains(&"USH0037"));
    }

    #[test]
    fn nested_type_and_constructor_report_0027_0028() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    A() {}\n    class Nested {}\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0027"));
        assert!(ids.contains(&"USH0028"));
    }

    #[test]
    fn plain_method_reports_nothing() {
        let diags = analyze("class A : UdonSharpBehaviour {\n    public void Foo() {}\n}\n");
        assert!(diags.is_empty());
    }
}
