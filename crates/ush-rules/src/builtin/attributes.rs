//! Attribute consistency (USH0040-0042): `[FieldChangeCallback(nameof(Prop))]`
//! on a backing field must name exactly one property, with a matching type,
//! and no other field may claim the same property.

use std::collections::HashMap;

use ush_core::cst::ast::{FieldDecl, Member, NameofExpr};
use ush_core::cst::UshSyntaxNode;
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

fn field_change_callback_target(field: &FieldDecl) -> Option<String> {
    let attr = field
        .attribute_lists()
        .into_iter()
        .flat_map(|l| l.attributes())
        .find(|a| a.normalized_name().as_deref() == Some("FieldChangeCallback"))?;
    let arg = attr.args().into_iter().next()?;
    let nameof = arg.syntax().children().find_map(NameofExpr::cast)?;
    let qualified = nameof.qualified_name()?;
    Some(qualified.syntax().text().to_string())
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for type_decl in util::file_type_decls(ctx.root()) {
        if !util::is_udonsharp_script(&type_decl) {
            continue;
        }

        let members = type_decl.members();
        let mut targets: HashMap<String, Vec<(String, UshSyntaxNode)>> = HashMap::new();

        for member in &members {
            let Member::Field(field) = member else { continue };
            let Some(target) = field_change_callback_target(field) else { continue };
            let field_name = field.declarators().next().and_then(|d| d.name()).unwrap_or_default();
            targets.entry(target).or_default().push((field_name, field.syntax().clone()));
        }

        for (target, fields) in &targets {
            if fields.len() > 1 {
                for (_, node) in fields {
                    out.push(ctx.diagnostic(
                        "USH0040",
                        format!("Property '{target}' is targeted by more than one [FieldChangeCallback] field."),
                        node,
                    ));
                }
                continue;
            }

            let property = members.iter().find_map(|m| match m {
                Member::Property(p) if p.name().as_deref() == Some(target.as_str()) => Some(p.clone()),
                _ => None,
            });

            let (field_name, field_node) = &fields[0];
            let Some(property) = property else {
                out.push(ctx.diagnostic(
                    "USH0041",
                    format!("Property '{target}' referenced by [FieldChangeCallback] does not exist."),
                    field_node,
                ));
                continue;
            };

            let field = members.iter().find_map(|m| match m {
                Member::Field(f) if f.declarators().next().and_then(|d| d.name()).as_deref() == Some(field_name.as_str()) => Some(f.clone()),
                _ => None,
            });
            let field_type = field.as_ref().and_then(|f| f.type_ref()).and_then(|t| t.simple_name());
            let property_type = property.type_ref().and_then(|t| t.simple_name());

            if let (Some(ft), Some(pt)) = (field_type, property_type) {
                if util::normalize_type_name(&ft) != util::normalize_type_name(&pt) {
                    out.push(ctx.diagnostic(
                        "USH0042",
                        format!("Property '{target}' has a different type than field '{field_name}'."),
                        field_node,
                    ));
                }
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
    fn missing_property_reports_0041() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [FieldChangeCallback(nameof(Score))]\n    int _score;\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0041"));
    }

    #[test]
    fn mismatched_property_type_reports_0042() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [FieldChangeCallback(nameof(Score))]\n    int _score;\n    float Score { get; set; }\n}\n",
        );
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0042"));
    }

    #[test]
    fn matching_property_reports_nothing() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [FieldChangeCallback(nameof(Score))]\n    int _score;\n    int Score { get; set; }\n}\n",
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn duplicate_target_reports_0040_for_both_fields() {
        let diags = analyze(
            "class A : UdonSharpBehaviour {\n    [FieldChangeCallback(nameof(Score))]\n    int _a;\n    [FieldChangeCallback(nameof(Score))]\n    int _b;\n    int Score { get; set; }\n}\n",
        );
        let count = diags.iter().filter(|d| d.rule_id == "USH0040").count();
        assert_eq!(count, 2);
    }
}
