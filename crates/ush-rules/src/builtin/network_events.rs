//! Network events (USH0001-0006, USH0043).
//!
//! Only the syntax-only resolution path is implemented, since no symbol
//! table is available to back a semantic-first pass: the target type of a
//! `SendCustomEvent`/`SendCustomNetworkEvent` call is
//! found either through a `nameof(Type.Member)` type hint or through the
//! enclosing type when the call has no explicit receiver or targets `this`.
//! A call whose receiver is some other expression has no resolvable target
//! under this path, so every target-dependent check silently skips it
//! rather than guess.

use ush_core::cst::ast::{descendants, InvocationExpr, MemberAccessExpr, MethodDecl, NameofExpr, QualifiedName, TypeDecl};
use ush_core::cst::{UshSyntaxKind, UshSyntaxNode};
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

struct EventNameArg {
    node: UshSyntaxNode,
    method_name: String,
    type_hint: Option<String>,
    is_bare_literal: bool,
}

fn read_event_name(expr: &UshSyntaxNode) -> Option<EventNameArg> {
    match expr.kind() {
        UshSyntaxKind::LiteralExpr => {
            util::literal_expr_type(expr).filter(|t| *t == "string")?;
            let token = expr
                .children_with_tokens()
                .filter_map(|e| e.into_token())
                .find(|t| t.kind() == UshSyntaxKind::StringLiteral)?;
            let value = token.text().trim_matches('"').to_string();
            Some(EventNameArg { node: expr.clone(), method_name: value, type_hint: None, is_bare_literal: true })
        }
        UshSyntaxKind::NameofExpr => {
            let nameof = NameofExpr::cast(expr.clone())?;
            let qualified = nameof.syntax().children().find_map(QualifiedName::cast)?;
            let full = qualified.syntax().text().to_string();
            let mut segments: Vec<&str> = full.split('.').collect();
            let method_name = segments.pop()?.to_string();
            let type_hint = if segments.is_empty() { None } else { Some(segments.join(".")) };
            Some(EventNameArg { node: expr.clone(), method_name, type_hint, is_bare_literal: false })
        }
        _ => None,
    }
}

fn resolve_target_type(invocation: &InvocationExpr, root: &UshSyntaxNode, hint: Option<&str>) -> Option<TypeDecl> {
    let all = util::file_type_decls(root);
    if let Some(hint) = hint {
        if let Some(found) = all.iter().find(|t| t.name().as_deref() == Some(hint)) {
            return Some(found.clone());
        }
    }
    let target = invocation.target()?;
    match target.kind() {
        UshSyntaxKind::IdentExpr => util::enclosing_type_decl(invocation.syntax()),
        UshSyntaxKind::MemberAccessExpr => {
            let ma = MemberAccessExpr::cast(target)?;
            let inner = ma.target()?;
            if inner.kind() == UshSyntaxKind::ThisExpr {
                util::enclosing_type_decl(invocation.syntax())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn candidates_by_name(type_decl: &TypeDecl, name: &str) -> Vec<MethodDecl> {
    type_decl
        .members()
        .into_iter()
        .filter_map(|m| m.as_method().cloned())
        .filter(|m| m.name().as_deref() == Some(name))
        .collect()
}

fn arg_expr(arg: &ush_core::cst::ast::Arg) -> Option<UshSyntaxNode> {
    arg.syntax().children().next()
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let root = ctx.root();

    for type_decl in util::file_type_decls(root) {
        if !util::is_udonsharp_script(&type_decl) {
            continue;
        }
        let invocations = descendants(type_decl.syntax(), InvocationExpr::cast);
        for invocation in invocations {
            let Some(method_name_ident) = invocation.method_name() else { continue };
            let is_network = method_name_ident.starts_with("SendCustomNetworkEvent");
            let is_custom = method_name_ident.starts_with("SendCustomEvent");
            if !is_network && !is_custom {
                continue;
            }

            let args = invocation.args();
            // The network family is always called with an explicit leading
            // target argument followed by the `NetworkEventTarget` enum
            // value, so the event-name argument sits two positions in; the
            // custom (local) family has no such leading arguments.
            let event_idx = if is_network { 2 } else { 0 };
            let Some(event_arg) = args.get(event_idx) else { continue };
            let Some(expr) = arg_expr(event_arg) else { continue };
            let Some(event) = read_event_name(&expr) else { continue };

            if event.is_bare_literal {
                out.push(ctx.diagnostic("USH0043", format!("Use nameof({0}) instead of the string literal \"{0}\".", event.method_name), &event.node));
            }

            if is_network && event.method_name.starts_with('_') {
                out.push(ctx.diagnostic(
                    "USH0003",
                    format!("Network event name '{}' must not begin with an underscore.", event.method_name),
                    &event.node,
                ));
            }

            let target_type = resolve_target_type(&invocation, root, event.type_hint.as_deref());
            let Some(target_type) = target_type else { continue };
            let candidates = candidates_by_name(&target_type, &event.method_name);

            if candidates.is_empty() {
                out.push(ctx.diagnostic(
                    "USH0001",
                    format!("Method '{}' does not exist on the target type.", event.method_name),
                    &event.node,
                ));
                continue;
            }

            if !candidates.iter().any(|c| c.is_public()) {
                out.push(ctx.diagnostic(
                    "USH0002",
                    format!("Method '{}' exists but is not public.", event.method_name),
                    &event.node,
                ));
            }

            let payload_args: Vec<_> = args[event_idx.saturating_add(1).min(args.len())..].to_vec();
            if !payload_args.is_empty() && !candidates.iter().any(|c| c.has_attribute("NetworkCallable")) {
                out.push(ctx.diagnostic(
                    "USH0004",
                    format!(
                        "'{}' is sent with payload arguments but no matching method is marked [NetworkCallable].",
                        event.method_name
                    ),
                    &event.node,
                ));
            }

            if let Some(arity_match) = candidates.iter().find(|c| c.parameters().len() == payload_args.len()) {
                let params = arity_match.parameters();
                let mut mismatch = None;
                for (i, arg) in payload_args.iter().enumerate() {
                    let Some(param) = params.get(i) else { continue };
                    let Some(param_type) = param.type_ref().map(|t| t.simple_name().unwrap_or_default()) else { continue };
                    if param.is_ref_or_out() && ctx.settings.allow_ref_out {
                        continue;
                    }
                    let Some(arg_node) = arg_expr(arg) else { continue };
                    let Some(arg_type) = util::literal_expr_type(&arg_node) else { continue };
                    if !util::types_compatible(arg_type, &param_type) {
                        mismatch = Some((i, arg_node));
                        break;
                    }
                }
                if let Some((index, node)) = mismatch {
                    out.push(ctx.diagnostic(
                        "USH0005",
                        format!("Argument {} does not implicitly convert to the parameter type of '{}'.", index + 1, event.method_name),
                        &node,
                    ));
                }
            } else if !candidates.is_empty() {
                out.push(ctx.diagnostic(
                    "USH0005",
                    format!("Argument 0 does not implicitly convert to the parameter type of '{}'.", event.method_name),
                    invocation.syntax(),
                ));
            }

            if is_network && util::sync_mode_of(&target_type) == util::SyncMode::None {
                out.push(ctx.diagnostic(
                    "USH0006",
                    format!("'{}' is sent to a target whose sync mode is None.", event.method_name),
                    invocation.syntax(),
                ));
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
    fn missing_target_reports_0001_and_0043() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    public void Foo() {}\n    void Bar() { SendCustomEvent(\"DoesNotExist\"); }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0001"));
        assert!(ids.contains(&"USH0043"));
    }

    #[test]
    fn private_target_reports_0002_only() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    private void Secret() {}\n    void Bar() { SendCustomEvent(nameof(Secret)); }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["USH0002"]);
    }

    #[test]
    fn payload_type_mismatch_reports_0005_with_index() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [NetworkCallable] public void Shoot(int n) {}\n    void Bar() { SendCustomNetworkEvent(target, NetworkEventTarget.All, nameof(Shoot), \"hello\"); }\n}\n",
        );
        let mismatch = diags.iter().find(|d| d.rule_id == "USH0005").expect("USH0005 present");
        assert!(mismatch.message.contains("Argument 1"));
    }

    #[test]
    fn none_sync_target_reports_0006() {
        let diags = analyze(
            "[UdonBehaviourSyncMode(BehaviourSyncMode.None)]\nclass A : UdonSharpBehaviour {\n    public void Foo() {}\n    void Bar() { SendCustomNetworkEvent(target, NetworkEventTarget.All, nameof(Foo)); }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0006"));
    }
}
