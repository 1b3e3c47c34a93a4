//! Rule Descriptors: the canonical table of rule IDs with default severity,
//! category, message template, and help link. This is the Rust-side source
//! of truth the bundled policy pack under `ush-lsp/PolicyPacks/default.json`
//! is generated from; `to_rule_definitions` lets anything embedding this
//! crate (tests, the LSP binary when the bundled file is missing) rebuild
//! the same catalogue in memory.

use std::collections::HashMap;

use ush_core::diagnostics::Severity;
use ush_core::policy::RuleDefinition;

/// One row of the canonical catalogue. `message` uses `{0}`, `{1}`, …
/// positional placeholders, matching the policy pack wire format.
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub help_uri: Option<&'static str>,
    pub has_code_fix: bool,
}

macro_rules! rule {
    ($id:literal, $title:literal, $message:literal, $category:literal, $severity:ident) => {
        RuleDescriptor {
            id: $id,
            title: $title,
            message: $message,
            category: $category,
            default_severity: Severity::$severity,
            help_uri: None,
            has_code_fix: false,
        }
    };
}

pub const RULE_DESCRIPTORS: &[RuleDescriptor] = &[
    // Network events
    rule!("USH0001", "Network event target not found", "Method '{0}' does not exist on the target type.", "Network", Error),
    rule!("USH0002", "Network event target not public", "Method '{0}' exists but is not public.", "Network", Error),
    rule!("USH0003", "Network event name begins with underscore", "Network event name '{0}' must not begin with an underscore.", "Network", Error),
    rule!("USH0004", "Network event payload without NetworkCallable", "'{0}' is sent with payload arguments but no matching method is marked [NetworkCallable].", "Network", Error),
    rule!("USH0005", "Network event payload type mismatch", "Argument {0} does not implicitly convert to the parameter type of '{1}'.", "Network", Error),
    rule!("USH0006", "Network event sent to SyncMode.None target", "'{0}' is sent to a target whose sync mode is None.", "Network", Error),
    rule!("USH0043", "Network event name is a bare literal", "Use nameof({0}) instead of the string literal \"{0}\".", "Network", Information),
    // Synchronization
    rule!("USH0007", "Synced field on NoVariableSync type", "Field '{0}' is [UdonSynced] but the enclosing type uses BehaviourSyncMode.NoVariableSync.", "Synchronization", Error),
    rule!("USH0008", "Unsupported synced field type", "Field '{0}' has type '{1}', which is not a supported synced type.", "Synchronization", Error),
    rule!("USH0009", "Synced array requires Manual sync", "Array field '{0}' requires BehaviourSyncMode.Manual.", "Synchronization", Error),
    rule!("USH0010", "Tweened sync mode requires Manual sync", "Field '{0}' declares a tweening mode but the enclosing type is not BehaviourSyncMode.Manual.", "Synchronization", Error),
    rule!("USH0011", "Unsupported linear-tween type", "Field '{0}' has type '{1}', which does not support linear interpolation.", "Synchronization", Error),
    rule!("USH0012", "Unsupported smooth-tween type", "Field '{0}' has type '{1}', which does not support smooth interpolation.", "Synchronization", Error),
    // API exposure
    rule!("USH0013", "Forbidden API call", "Method '{0}' is not available to UdonSharp scripts.", "ApiExposure", Error),
    rule!("USH0014", "Forbidden member access", "Member '{0}' is not available to UdonSharp scripts.", "ApiExposure", Error),
    rule!("USH0015", "Forbidden type reference", "Type '{0}' is not available to UdonSharp scripts.", "ApiExposure", Error),
    // Runtime restrictions
    rule!("USH0016", "Runtime event signature mismatch", "'{0}' must be declared 'public override void {0}(VRCPlayerApi)'.", "Runtime", Error),
    rule!("USH0017", "Instantiate without GameObject argument", "Instantiate must be called with a GameObject argument.", "Runtime", Error),
    rule!("USH0018", "'is'-pattern usage", "'is'-pattern expressions are not supported.", "Runtime", Error),
    rule!("USH0019", "'as'-cast usage", "'as'-cast expressions are not supported.", "Runtime", Error),
    rule!("USH0020", "try/catch/finally usage", "try/catch/finally blocks are not supported.", "Runtime", Error),
    rule!("USH0021", "throw usage", "throw statements and expressions are not supported.", "Runtime", Error),
    // Language constraints
    rule!("USH0022", "Nullable value type", "Nullable value types are not supported.", "Language", Error),
    rule!("USH0023", "Null-conditional access", "Null-conditional access ('?.' / '?[]') is not supported.", "Language", Error),
    rule!("USH0024", "Multi-dimensional array", "Multi-dimensional arrays are not supported; use jagged arrays instead.", "Language", Error),
    rule!("USH0025", "Multi-argument element access", "Element access with more than one argument is not supported.", "Language", Error),
    rule!("USH0026", "Local function declaration", "Local function declarations are not supported.", "Language", Error),
    rule!("USH0027", "Nested type declaration", "Nested type declarations are not supported.", "Language", Error),
    rule!("USH0028", "User-written constructor", "User-written constructors are not supported.", "Language", Error),
    rule!("USH0029", "Generic method declaration", "Generic method declarations are not supported.", "Language", Error),
    rule!("USH0030", "Interface in base list", "Implementing interfaces is not supported.", "Language", Error),
    rule!("USH0031", "Method hides base member", "Method '{0}' coincides with a base-class method but is not declared 'override'.", "Language", Error),
    rule!("USH0032", "Object/collection initializer", "Object and collection initializer expressions are not supported.", "Language", Error),
    rule!("USH0033", "typeof an UdonSharp script", "'typeof' of an UdonSharp script type is not supported.", "Language", Error),
    rule!("USH0034", "Static member", "Static fields and properties are not supported.", "Language", Error),
    rule!("USH0035", "Partial method", "Partial methods are not supported.", "Language", Error),
    rule!("USH0036", "goto statement", "'goto' statements are not supported.", "Language", Error),
    rule!("USH0037", "Labelled statement", "Labelled statements are not supported.", "Language", Error),
    rule!("USH0038", "goto case", "'goto case' statements are not supported.", "Language", Error),
    rule!("USH0039", "goto default", "'goto default' statements are not supported.", "Language", Error),
    // Attributes
    rule!("USH0040", "Duplicate FieldChangeCallback target", "Property '{0}' is targeted by more than one [FieldChangeCallback] field.", "Attributes", Error),
    rule!("USH0041", "FieldChangeCallback target missing", "Property '{0}' referenced by [FieldChangeCallback] does not exist.", "Attributes", Error),
    rule!("USH0042", "FieldChangeCallback type mismatch", "Property '{0}' has a different type than field '{1}'.", "Attributes", Error),
    // Structure
    rule!("USH0044", "Type declared outside a namespace", "'{0}' should be declared inside a namespace.", "Structure", Information),
    rule!("USH0045", "Type name does not match file name", "Type '{0}' does not match the file name '{1}'.", "Structure", Warning),
];

/// Converts the canonical table to the runtime `RuleDefinition` shape, with
/// a `strict_experimental` profile entry that only ever escalates a rule's
/// severity (Information -> Warning -> Error), never relaxes it, so the
/// "toggling profile must never decrease severity" property holds for the
/// built-in catalogue by construction.
pub fn to_rule_definitions() -> HashMap<String, RuleDefinition> {
    RULE_DESCRIPTORS
        .iter()
        .map(|d| {
            let mut profiles = HashMap::new();
            let escalated = match d.default_severity {
                Severity::Information => Some(Severity::Warning),
                Severity::Warning => Some(Severity::Error),
                _ => None,
            };
            if let Some(escalated) = escalated {
                profiles.insert("strict_experimental".to_string(), escalated);
            }
            let def = RuleDefinition {
                id: d.id.to_string(),
                title: d.title.to_string(),
                message: d.message.to_string(),
                category: d.category.to_string(),
                default_severity: d.default_severity,
                help_uri: d.help_uri.map(|s| s.to_string()),
                has_code_fix: d.has_code_fix,
                profiles,
                documentation: HashMap::new(),
            };
            (d.id.to_string(), def)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_descriptor_id_is_unique_and_well_formed() {
        let mut seen = std::collections::HashSet::new();
        for d in RULE_DESCRIPTORS {
            assert!(d.id.starts_with("USH"), "unexpected id shape: {}", d.id);
            assert!(seen.insert(d.id), "duplicate descriptor id: {}", d.id);
        }
        assert_eq!(RULE_DESCRIPTORS.len(), 45);
    }

    #[test]
    fn strict_profile_never_decreases_severity() {
        for def in to_rule_definitions().values() {
            let strict = def.severity_for_profile("strict_experimental");
            assert!(strict >= def.default_severity, "{} regressed under strict profile", def.id);
        }
    }
}
