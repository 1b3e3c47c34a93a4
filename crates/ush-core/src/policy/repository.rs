//! Policy Repository: the merged rule catalogue, atomically swappable on
//! reload, consulted by the rule engine for severity and documentation
//! resolution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::RuleDefinition;
use crate::diagnostics::Severity;
use crate::settings::Settings;

/// Shared, atomically-replaceable catalogue of rule definitions.
///
/// Reload (policy pack reload, or a settings change that touches
/// `policyPackPaths`) swaps the inner map behind a single write lock;
/// concurrent analyses read through `Arc` clones taken before the swap, so
/// an in-flight analysis always sees one consistent snapshot.
pub struct PolicyRepository {
    rules: RwLock<Arc<HashMap<String, RuleDefinition>>>,
}

impl PolicyRepository {
    pub fn new(rules: HashMap<String, RuleDefinition>) -> Self {
        Self {
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    /// Atomically replace the catalogue.
    pub fn reload(&self, rules: HashMap<String, RuleDefinition>) {
        let mut guard = self.rules.write().expect("policy repository lock poisoned");
        *guard = Arc::new(rules);
    }

    fn snapshot(&self) -> Arc<HashMap<String, RuleDefinition>> {
        self.rules.read().expect("policy repository lock poisoned").clone()
    }

    /// All rules in stable order by ID.
    pub fn all_rules(&self) -> Vec<RuleDefinition> {
        let snapshot = self.snapshot();
        let mut rules: Vec<RuleDefinition> = snapshot.values().cloned().collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        rules
    }

    pub fn get_rule(&self, id: &str) -> Option<RuleDefinition> {
        self.snapshot().get(&id.to_ascii_uppercase()).cloned()
    }

    /// Severity resolution order: (1) user override for the ID, (2) the
    /// rule's `profiles[profile]` entry, (3) the rule's default. An
    /// unrecognised ID (no longer, or never, in the catalogue) resolves to
    /// `Hidden` so a stale diagnostic is suppressed rather than surfaced.
    pub fn get_severity(&self, id: &str, settings: &Settings) -> Severity {
        let upper = id.to_ascii_uppercase();
        if let Some(severity) = settings.rule_overrides.get(&upper) {
            return *severity;
        }
        match self.get_rule(&upper) {
            Some(def) => def.severity_for_profile(&settings.profile),
            None => Severity::Hidden,
        }
    }

    /// Exact locale, falling back to `en-US`, falling back to `None`.
    pub fn get_documentation(&self, id: &str, locale: &str) -> Option<String> {
        self.get_rule(id)
            .and_then(|def| def.markdown_for_locale(locale).map(|s| s.to_string()))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PolicyRepository {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, default: Severity) -> RuleDefinition {
        RuleDefinition {
            id: id.to_string(),
            title: "t".into(),
            message: "m".into(),
            category: "Network".into(),
            default_severity: default,
            help_uri: None,
            has_code_fix: false,
            profiles: HashMap::new(),
            documentation: HashMap::new(),
        }
    }

    #[test]
    fn all_rules_sorted_by_id() {
        let mut rules = HashMap::new();
        rules.insert("USH0002".to_string(), rule("USH0002", Severity::Warning));
        rules.insert("USH0001".to_string(), rule("USH0001", Severity::Error));
        let repo = PolicyRepository::new(rules);
        let ids: Vec<_> = repo.all_rules().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["USH0001".to_string(), "USH0002".to_string()]);
    }

    #[test]
    fn user_override_wins_over_default() {
        let mut rules = HashMap::new();
        rules.insert("USH0043".to_string(), rule("USH0043", Severity::Warning));
        let repo = PolicyRepository::new(rules);
        let mut settings = Settings::default();
        settings
            .rule_overrides
            .insert("USH0043".to_string(), Severity::Hidden);
        assert_eq!(repo.get_severity("USH0043", &settings), Severity::Hidden);
    }

    #[test]
    fn unknown_rule_resolves_hidden() {
        let repo = PolicyRepository::empty();
        let settings = Settings::default();
        assert_eq!(repo.get_severity("USH9999", &settings), Severity::Hidden);
    }

    #[test]
    fn reload_replaces_catalogue_atomically() {
        let repo = PolicyRepository::empty();
        assert!(repo.is_empty());
        let mut rules = HashMap::new();
        rules.insert("USH0044".to_string(), rule("USH0044", Severity::Error));
        repo.reload(rules);
        assert_eq!(repo.len(), 1);
    }
}
