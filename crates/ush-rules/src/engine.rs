//! The rule engine: runs every registered family over one document, resolves
//! each diagnostic's severity through the Policy Repository, and isolates a
//! misbehaving family so one bad rule cannot take the whole analysis down.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use ush_core::diagnostics::{Diagnostic, Severity};
use ush_core::policy::PolicyRepository;
use ush_core::settings::Settings;
use ush_core::workspace::{CompilationContext, Document};

use crate::builtin::FAMILIES;
use crate::context::RuleContext;

/// Runs every rule family over `document` and returns diagnostics with their
/// final, policy-resolved severities. Diagnostics whose resolved severity is
/// `Hidden` (an unknown ID, or an explicit user override) are dropped rather
/// than published, matching how the Policy Repository's resolution order is
/// meant to be consumed.
pub fn analyze(
    document: &Document,
    settings: &Settings,
    compilation: &CompilationContext,
    policy: &PolicyRepository,
    cancellation: &CancellationToken,
) -> Vec<Diagnostic> {
    let ctx = RuleContext::new(document, settings, compilation);
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for family in FAMILIES {
        if cancellation.is_cancelled() {
            break;
        }

        let result = catch_unwind(AssertUnwindSafe(|| (family.run)(&ctx)));
        let diagnostics = match result {
            Ok(diagnostics) => diagnostics,
            Err(_) => {
                warn!(family = family.name, "rule family panicked; skipping its diagnostics for this analysis");
                continue;
            }
        };

        for mut diagnostic in diagnostics {
            let severity = policy.get_severity(&diagnostic.rule_id, settings);
            if severity == Severity::Hidden {
                continue;
            }
            diagnostic.severity = severity;

            let key = (
                diagnostic.rule_id.clone(),
                diagnostic.message.clone(),
                diagnostic.location.start_line,
                diagnostic.location.start_column,
                diagnostic.location.end_line,
                diagnostic.location.end_column,
            );
            if seen.insert(key) {
                out.push(diagnostic);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::to_rule_definitions;

    fn policy_with_catalogue() -> PolicyRepository {
        PolicyRepository::new(to_rule_definitions())
    }

    #[test]
    fn analyze_resolves_severities_from_policy() {
        let document = Document::new(
            "file:///Test.cs",
            "class A : UdonSharpBehaviour {\n    public void Foo() {}\n    void Bar() { SendCustomEvent(\"Missing\"); }\n}\n",
        );
        let settings = Settings::default();
        let compilation = CompilationContext::build(&settings, std::path::Path::new("."));
        let policy = policy_with_catalogue();
        let diagnostics = analyze(&document, &settings, &compilation, &policy, &CancellationToken::new());

        let missing = diagnostics.iter().find(|d| d.rule_id == "USH0001").expect("USH0001 present");
        assert_eq!(missing.severity, Severity::Error);
    }

    #[test]
    fn analyze_hides_diagnostics_with_user_override() {
        let document = Document::new(
            "file:///Test.cs",
            "class A : UdonSharpBehaviour {\n    void Bar() { SendCustomEvent(\"Missing\"); }\n}\n",
        );
        let mut settings = Settings::default();
        settings.rule_overrides.insert("USH0001".to_string(), Severity::Hidden);
        let compilation = CompilationContext::build(&settings, std::path::Path::new("."));
        let policy = policy_with_catalogue();
        let diagnostics = analyze(&document, &settings, &compilation, &policy, &CancellationToken::new());

        assert!(diagnostics.iter().all(|d| d.rule_id != "USH0001"));
    }

    #[test]
    fn analyze_respects_cancellation() {
        let document = Document::new("file:///Test.cs", "class A : UdonSharpBehaviour {\n}\n");
        let settings = Settings::default();
        let compilation = CompilationContext::build(&settings, std::path::Path::new("."));
        let policy = policy_with_catalogue();
        let token = CancellationToken::new();
        token.cancel();
        let diagnostics = analyze(&document, &settings, &compilation, &policy, &token);
        assert!(diagnostics.is_empty());
    }
}
