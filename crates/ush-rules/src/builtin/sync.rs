//! Synchronization (USH0007-0012): triggered on field declarations in
//! UdonSharp scripts carrying a `UdonSynced` attribute.

use ush_core::cst::ast::{Attribute, FieldDecl, TypeRef};
use ush_core::cst::UshSyntaxKind;
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util::{self, SyncMode, TweenMode};

fn udon_synced_attribute(field: &FieldDecl) -> Option<Attribute> {
    field
        .attribute_lists()
        .into_iter()
        .flat_map(|l| l.attributes())
        .find(|a| a.normalized_name().as_deref() == Some("UdonSynced"))
}

fn is_array(type_ref: &TypeRef) -> bool {
    type_ref
        .syntax()
        .children()
        .any(|n| n.kind() == UshSyntaxKind::ArrayTypeSuffix)
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for type_decl in util::file_type_decls(ctx.root()) {
        if !util::is_udonsharp_script(&type_decl) {
            continue;
        }
        let sync_mode = util::sync_mode_of(&type_decl);

        for member in type_decl.members() {
            let Some(field) = member.as_field() else { continue };
            let Some(attr) = udon_synced_attribute(field) else { continue };
            let Some(type_ref) = field.type_ref() else { continue };
            let field_name = field
                .declarators()
                .next()
                .and_then(|d| d.name())
                .unwrap_or_default();

            if sync_mode == SyncMode::NoVariableSync {
                out.push(ctx.diagnostic(
                    "USH0007",
                    format!("Field '{field_name}' is [UdonSynced] but the enclosing type uses BehaviourSyncMode.NoVariableSync."),
                    field.syntax(),
                ));
            }

            let simple_name = type_ref.simple_name().unwrap_or_default();
            let array = is_array(&type_ref);
            if !util::is_supported_synced_type(&simple_name) {
                out.push(ctx.diagnostic(
                    "USH0008",
                    format!("Field '{field_name}' has type '{simple_name}', which is not a supported synced type."),
                    field.syntax(),
                ));
            }

            if array && sync_mode != SyncMode::Manual {
                out.push(ctx.diagnostic(
                    "USH0009",
                    format!("Array field '{field_name}' requires BehaviourSyncMode.Manual."),
                    field.syntax(),
                ));
            }

            let tween_mode = tween_mode(&attr);
            if tween_mode != TweenMode::None && sync_mode != SyncMode::Manual {
                out.push(ctx.diagnostic(
                    "USH0010",
                    format!("Field '{field_name}' declares a tweening mode but the enclosing type is not BehaviourSyncMode.Manual."),
                    field.syntax(),
                ));
            }

            match tween_mode {
                TweenMode::Linear if !util::LINEAR_TWEEN_TYPES.contains(&simple_name.as_str()) => {
                    out.push(ctx.diagnostic(
                        "USH0011",
                        format!("Field '{field_name}' has type '{simple_name}', which does not support linear interpolation."),
                        field.syntax(),
                    ));
                }
                TweenMode::Smooth if !util::SMOOTH_TWEEN_TYPES.contains(&simple_name.as_str()) => {
                    out.push(ctx.diagnostic(
                        "USH0012",
                        format!("Field '{field_name}' has type '{simple_name}', which does not support smooth interpolation."),
                        field.syntax(),
                    ));
                }
                _ => {}
            }
        }
    }

    out
}

fn tween_mode(attr: &Attribute) -> TweenMode {
    util::tween_mode_of(attr)
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
    fn unsupported_synced_type_reports_0008() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [UdonSynced] Dictionary<string, int> map;\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0008"));
    }

    #[test]
    fn synced_array_without_manual_reports_0009() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [UdonSynced] int[] values;\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0009"));
    }

    #[test]
    fn plain_supported_field_reports_nothing() {
        let diags = analyze(
            "[UdonBehaviourSyncMode(BehaviourSyncMode.Manual)]\nclass A : UdonSharpBehaviour {\n    [UdonSynced] int score;\n}\n",
        );
        assert!(diags.is_empty());
    }
}
