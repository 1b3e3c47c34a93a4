//! Runtime restrictions (USH0016-0021).

use ush_core::cst::ast::{
    descendants, AsExpr, IdentExpr, InvocationExpr, IsExpr, MethodDecl, ObjectCreationExpr, TypeDecl, TypeRef,
};
use ush_core::cst::UshSyntaxKind;
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

const VR_RUNTIME_EVENTS: &[&str] = &[
    "OnStationEntered",
    "OnStationExited",
    "OnOwnershipTransferred",
    "OnPlayerJoined",
    "OnPlayerLeft",
];

fn matches_event_signature(method: &MethodDecl) -> bool {
    let params = method.parameters();
    if params.len() != 1 {
        return false;
    }
    let Some(type_ref) = params[0].type_ref() else { return false };
    type_ref.simple_name().as_deref() == Some("VRCPlayerApi")
}

fn declared_type_of(type_decl: &TypeDecl, method: Option<&MethodDecl>, name: &str) -> Option<TypeRef> {
    if let Some(method) = method {
        if let Some(param) = method.parameters().into_iter().find(|p| p.name().as_deref() == Some(name)) {
            return param.type_ref();
        }
    }
    type_decl.members().into_iter().find_map(|m| {
        let field = m.as_field()?;
        field.declarators().find(|d| d.name().as_deref() == Some(name))?;
        field.type_ref()
    })
}

fn instantiate_missing_game_object(invocation: &InvocationExpr, type_decl: &TypeDecl, method: Option<&MethodDecl>) -> bool {
    let Some(arg) = invocation.args().into_iter().next() else { return true };
    let Some(expr) = arg.syntax().children().next() else { return true };
    match expr.kind() {
        UshSyntaxKind::ObjectCreationExpr => ObjectCreationExpr::cast(expr)
            .and_then(|o| o.syntax().children().find_map(TypeRef::cast))
            .and_then(|t| t.simple_name())
            .map(|name| name != "GameObject")
            .unwrap_or(true),
        UshSyntaxKind::IdentExpr => {
            let Some(name) = IdentExpr::cast(expr).and_then(|i| i.name()) else { return true };
            declared_type_of(type_decl, method, &name)
                .and_then(|t| t.simple_name())
                .map(|name| name != "GameObject")
                .unwrap_or(true)
        }
        // Member access, call results and anything else cannot be typed without a
        // symbol table; treat as unresolved, matching the identifier case above.
        _ => true,
    }
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for type_decl in util::file_type_decls(ctx.root()) {
        if !util::is_udonsharp_script(&type_decl) {
            continue;
        }

        for member in type_decl.members() {
            let Some(method) = member.as_method() else { continue };
            let Some(name) = method.name() else { continue };
            if VR_RUNTIME_EVENTS.contains(&name.as_str()) {
                let is_override = method.modifiers().iter().any(|m| m == "override");
                if !method.is_public() || !is_override || !matches_event_signature(method) {
                    out.push(ctx.diagnostic(
                        "USH0016",
                        format!("'{name}' must be declared 'public override void {name}(VRCPlayerApi)'."),
                        method.syntax(),
                    ));
                }
            }
        }

        for invocation in descendants(type_decl.syntax(), InvocationExpr::cast) {
            if invocation.method_name().as_deref() != Some("Instantiate") {
                continue;
            }
            let enclosing_method = invocation.syntax().ancestors().find_map(MethodDecl::cast);
            if instantiate_missing_game_object(&invocation, &type_decl, enclosing_method.as_ref()) {
                out.push(ctx.diagnostic(
                    "USH0017",
                    "Instantiate must be called with a GameObject argument.",
                    invocation.syntax(),
                ));
            }
        }

        for is_expr in descendants(type_decl.syntax(), IsExpr::cast) {
            out.push(ctx.diagnostic("USH0018", "'is'-pattern expressions are not supported.", is_expr.syntax()));
        }

        for as_expr in descendants(type_decl.syntax(), AsExpr::cast) {
            out.push(ctx.diagnostic("USH0019", "'as'-cast expressions are not supported.", as_expr.syntax()));
        }

        for node in type_decl.syntax().descendants() {
            if node.kind() == UshSyntaxKind::TryStatement {
                out.push(ctx.diagnostic("USH0020", "try/catch/finally blocks are not supported.", &node));
            }
            if node.kind() == UshSyntaxKind::ThrowStatement {
                out.push(ctx.diagnostic("USH0021", "throw statements and expressions are not supported.", &node));
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
    fn instantiate_as_try_reports_0017_0019_0020() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo() {\n        var obj = Instantiate(prefab) as SomeComponent;\n        try {\n        }\n        catch {\n        }\n    }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0017"));
        assert!(ids.contains(&"USH0019"));
        assert!(ids.contains(&"USH0020"));
    }

    #[test]
    fn instantiate_with_game_object_is_clean() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo() {\n        var obj = Instantiate(new GameObject());\n    }\n}\n",
        );
        assert!(diags.iter().all(|d| d.rule_id != "USH0017"));
    }

    #[test]
    fn instantiate_with_declared_game_object_field_is_clean() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    GameObject prefab;\n    void Foo() {\n        var obj = Instantiate(prefab);\n    }\n}\n",
        );
        assert!(diags.iter().all(|d| d.rule_id != "USH0017"));
    }

    #[test]
    fn instantiate_with_non_game_object_parameter_reports_0017() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    void Foo(Transform prefab) {\n        var obj = Instantiate(prefab);\n    }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0017"));
    }

    #[test]
    fn mismatched_event_signature_reports_0016() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    public void OnPlayerJoined() {}\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0016"));
    }
}
