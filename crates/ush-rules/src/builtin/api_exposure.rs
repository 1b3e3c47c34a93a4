//! API exposure (USH0013-0015): a fixed deny-list of namespace prefixes,
//! type names, and member accesses that UdonSharp scripts may not reach.
//! All three checks unwrap one level of `Nullable<T>` before comparing,
//! per the normalised nullable-unwrapping rule.

use std::collections::HashSet;

use ush_core::cst::ast::{descendants, InvocationExpr, MemberAccessExpr, TypeRef};
use ush_core::cst::{UshSyntaxKind, UshSyntaxNode};
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

const FORBIDDEN_NAMESPACE_PREFIXES: &[&str] = &[
    "System.IO",
    "System.Net",
    "System.Reflection",
    "System.Threading",
    "System.Diagnostics",
    "System.Security",
    "System.Runtime.InteropServices",
    "System.Web",
    "UnityEditor",
];

/// Specific fully-qualified type names outside the banned namespaces above
/// that are nonetheless off-limits.
const FORBIDDEN_TYPES: &[&str] = &["System.AppDomain", "System.Environment", "System.GC"];

const FORBIDDEN_MEMBER_NAMES: &[&str] = &["GetComponent", "GetComponents"];

fn starts_with_forbidden_prefix(text: &str) -> bool {
    FORBIDDEN_NAMESPACE_PREFIXES.iter().any(|p| text == *p || text.starts_with(&format!("{p}.")))
        || FORBIDDEN_TYPES.contains(&text)
}

/// Unwraps one level of `Nullable<T>` / `T?`. `T?` already normalises to
/// the bare base name through `TypeRef::simple_name`, since the `?` suffix
/// is a sibling node rather than part of the name tokens; the explicit
/// `Nullable<T>` generic form needs its type argument read out.
fn unwrapped_type_text(type_ref: &TypeRef) -> String {
    let simple = type_ref.simple_name().unwrap_or_default();
    if simple != "Nullable" {
        return type_ref.full_text();
    }
    type_ref
        .syntax()
        .children()
        .find(|n| n.kind() == UshSyntaxKind::GenericArgList)
        .and_then(|list| list.children().find_map(TypeRef::cast))
        .map(|inner| inner.full_text())
        .unwrap_or_else(|| type_ref.full_text())
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for type_decl in util::file_type_decls(ctx.root()) {
        if !util::is_udonsharp_script(&type_decl) {
            continue;
        }

        let invocations = descendants(type_decl.syntax(), InvocationExpr::cast);
        let mut invocation_target_ranges = HashSet::new();

        for invocation in &invocations {
            let Some(target) = invocation.target() else { continue };
            invocation_target_ranges.insert(target.text_range());
            let Some(method_name) = invocation.method_name() else { continue };
            let target_text = target.text().to_string();
            if FORBIDDEN_MEMBER_NAMES.contains(&method_name.as_str()) || starts_with_forbidden_prefix(&target_text) {
                out.push(ctx.diagnostic(
                    "USH0013",
                    format!("Method '{method_name}' is not available to UdonSharp scripts."),
                    invocation.syntax(),
                ));
            }
        }

        for access in descendants(type_decl.syntax(), MemberAccessExpr::cast) {
            if invocation_target_ranges.contains(&access.syntax().text_range()) {
                continue;
            }
            let text = access.syntax().text().to_string();
            if starts_with_forbidden_prefix(&text) {
                let member = access.member_name().unwrap_or_default();
                out.push(ctx.diagnostic(
                    "USH0014",
                    format!("Member '{member}' is not available to UdonSharp scripts."),
                    access.syntax(),
                ));
            }
        }

        for type_ref in descendants(type_decl.syntax(), TypeRef::cast) {
            if !is_declaration_type_position(type_ref.syntax()) {
                continue;
            }
            let text = unwrapped_type_text(&type_ref);
            if starts_with_forbidden_prefix(&text) {
                out.push(ctx.diagnostic(
                    "USH0015",
                    format!("Type '{text}' is not available to UdonSharp scripts."),
                    type_ref.syntax(),
                ));
            }
        }
    }

    out
}

fn is_declaration_type_position(type_ref: &UshSyntaxNode) -> bool {
    type_ref
        .parent()
        .map(|p| {
            matches!(
                p.kind(),
                UshSyntaxKind::FieldDecl
                    | UshSyntaxKind::PropertyDecl
                    | UshSyntaxKind::Parameter
                    | UshSyntaxKind::LocalVarDecl
            )
        })
        .unwrap_or(false)
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
    fn forbidden_file_call_reports_0013() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo() { System.IO.File.ReadAllText(\"x\"); }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0013"));
    }

    #[test]
    fn get_component_call_reports_0013() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo() { GetComponent(); }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0013"));
    }

    #[test]
    fn forbidden_field_type_reports_0015() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    System.Reflection.Assembly asm;\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0015"));
    }

    #[test]
    fn ordinary_field_reports_nothing() {
        let diags = analyze("class A : UdonSharpBehaviour {\n    int score;\n}\n");
        assert!(diags.is_empty());
    }
}
