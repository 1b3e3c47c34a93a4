//! Structure (USH0044-0045): namespace placement and file/type naming.
//!
//! Unlike every other rule family, these two checks fire per type
//! declaration regardless of whether the type is an UdonSharp script —
//! a plain C# helper class living outside a namespace or misnamed against
//! its file is just as much a structural problem in this codebase.

use ush_core::cst::ast::CompilationUnit;
use ush_core::diagnostics::Diagnostic;

use crate::context::RuleContext;
use crate::util;

fn file_base_name(uri: &str) -> Option<String> {
    let file_name = uri.rsplit('/').next()?;
    file_name.strip_suffix(".cs").map(|s| s.to_string())
}

pub fn run(ctx: &RuleContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let Some(unit) = CompilationUnit::cast(ctx.root().clone()) else {
        return out;
    };

    let top_level: Vec<_> = unit.type_decls().collect();
    let base_name = file_base_name(ctx.uri());

    for type_decl in util::file_type_decls(ctx.root()) {
        let Some(name) = type_decl.name() else { continue };

        if top_level.contains(&type_decl) {
            out.push(ctx.diagnostic(
                "USH0044",
                format!("'{name}' should be declared inside a namespace."),
                type_decl.syntax(),
            ));
        }

        let is_abstract = type_decl.modifiers().iter().any(|m| m == "abstract");
        if !is_abstract {
            if let Some(base_name) = &base_name {
                if &name != base_name {
                    out.push(ctx.diagnostic(
                        "USH0045",
                        format!("Type '{name}' does not match the file name '{base_name}'."),
                        type_decl.syntax(),
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

    fn analyze(uri: &str, source: &str) -> Vec<Diagnostic> {
        let document = Document::new(uri, source);
        let settings = Settings::default();
        let compilation = CompilationContext::build(&settings, std::path::Path::new("."));
        let ctx = RuleContext::new(&document, &settings, &compilation);
        run(&ctx)
    }

    #[test]
    fn top_level_type_reports_0044() {
        let diags = analyze("file:///A.cs", "class A : UdonSharpBehaviour {\n}\n");
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0044"));
    }

    #[test]
    fn mismatched_file_name_reports_0045() {
        let diags = analyze("file:///Other.cs", "namespace N {\n    class A : UdonSharpBehaviour {\n    }\n}\n");
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0045"));
        assert!(!ids.contains(&"USH0044"));
    }

    #[test]
    fn matching_namespaced_type_reports_nothing() {
        let diags = analyze("file:///A.cs", "namespace N {\n    class A : UdonSharpBehaviour {\n    }\n}\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn fires_for_plain_class_not_an_udonsharp_script() {
        let diags = analyze("file:///Other.cs", "class Helper {\n}\n");
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"USH0044"));
        assert!(ids.contains(&"USH0045"));
    }
}
