//! Policy pack model: rule definitions, the pack loader, and the in-memory
//! repository rule implementations and the session consult for severity and
//! documentation.

mod loader;
mod repository;

pub use loader::PolicyPackLoader;
pub use repository::PolicyRepository;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;

/// A rule definition as loaded from a policy pack JSON file.
///
/// Identifiers are case-insensitive on input but always surfaced upper-case
/// (`id` is normalised to upper-case by the loader before it ever reaches
/// the repository).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: String,
    #[serde(rename = "defaultSeverity")]
    pub default_severity: Severity,
    #[serde(rename = "helpUri", skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    #[serde(rename = "hasCodeFix", default)]
    pub has_code_fix: bool,
    #[serde(default)]
    pub profiles: HashMap<String, Severity>,
    /// locale -> { field -> value }, always carrying at least `markdown`.
    #[serde(default)]
    pub documentation: HashMap<String, HashMap<String, String>>,
}

impl RuleDefinition {
    /// Severity for `profile`, falling back to the rule's own default when
    /// the profile is unrecognised or does not override this rule.
    pub fn severity_for_profile(&self, profile: &str) -> Severity {
        self.profiles
            .get(profile)
            .copied()
            .unwrap_or(self.default_severity)
    }

    pub fn markdown_for_locale(&self, locale: &str) -> Option<&str> {
        self.documentation
            .get(locale)
            .or_else(|| self.documentation.get("en-US"))
            .and_then(|fields| fields.get("markdown"))
            .map(|s| s.as_str())
    }
}

/// Raw shape of a policy pack JSON file: `{ "rules": [ ... ] }`.
#[derive(Debug, Deserialize)]
struct PolicyPackFile {
    rules: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_for_profile_falls_back_to_default() {
        let def = RuleDefinition {
            id: "USH0001".into(),
            title: "t".into(),
            message: "m".into(),
            category: "Network".into(),
            default_severity: Severity::Error,
            help_uri: None,
            has_code_fix: false,
            profiles: HashMap::new(),
            documentation: HashMap::new(),
        };
        assert_eq!(def.severity_for_profile("latest"), Severity::Error);
    }

    #[test]
    fn severity_for_profile_honours_profile_override() {
        let mut profiles = HashMap::new();
        profiles.insert("strict_experimental".to_string(), Severity::Error);
        let def = RuleDefinition {
            id: "USH0043".into(),
            title: "t".into(),
            message: "m".into(),
            category: "Network".into(),
            default_severity: Severity::Warning,
            help_uri: None,
            has_code_fix: false,
            profiles,
            documentation: HashMap::new(),
        };
        assert_eq!(def.severity_for_profile("strict_experimental"), Severity::Error);
        assert_eq!(def.severity_for_profile("legacy_0.x"), Severity::Warning);
    }
}
