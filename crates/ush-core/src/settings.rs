//! Settings Resolver: normalises configuration payloads scoped to the
//! `udonsharpLinter` key (LSP `initializationOptions` and
//! `workspace/didChangeConfiguration`) into an immutable snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;

/// How the project's Unity/VRChat API surface is provided to the compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnityApiSurface {
    BundledStubs,
    CustomStubs,
    None,
}

impl Default for UnityApiSurface {
    fn default() -> Self {
        UnityApiSurface::BundledStubs
    }
}

/// Telemetry aggregation level; `off` disables it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Telemetry {
    Off,
    Minimal,
}

impl Default for Telemetry {
    fn default() -> Self {
        Telemetry::Minimal
    }
}

/// Raw configuration payload as received over the wire, before
/// normalisation. Every field is optional; absent fields fall back to the
/// resolved default the same way an unrecognised enum value does.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    pub profile: Option<String>,
    #[serde(rename = "ruleOverrides", default)]
    pub rule_overrides: HashMap<String, String>,
    #[serde(rename = "unityApiSurface")]
    pub unity_api_surface: Option<String>,
    #[serde(rename = "customStubPath")]
    pub custom_stub_path: Option<String>,
    #[serde(rename = "allowRefOut")]
    pub allow_ref_out: Option<bool>,
    #[serde(rename = "codeActionsEnabled")]
    pub code_actions_enabled: Option<bool>,
    pub telemetry: Option<String>,
    #[serde(rename = "policyPackPaths", default)]
    pub policy_pack_paths: Vec<String>,
}

/// Immutable settings snapshot. Recomputed whole on every configuration
/// change; compared structurally against the prior snapshot so the session
/// only re-publishes when something actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: String,
    pub rule_overrides: HashMap<String, Severity>,
    pub unity_api_surface: UnityApiSurface,
    pub custom_stub_path: Option<PathBuf>,
    pub allow_ref_out: bool,
    pub code_actions_enabled: bool,
    pub telemetry: Telemetry,
    pub policy_pack_paths: Vec<PathBuf>,
}

const RECOGNISED_PROFILES: &[&str] = &["latest", "legacy_0.x", "strict_experimental"];

impl Settings {
    /// Normalise a raw payload against a base directory used to resolve
    /// relative and `~`-prefixed paths.
    pub fn resolve(raw: &RawSettings, base_dir: &Path) -> Self {
        let profile = raw
            .profile
            .clone()
            .filter(|p| RECOGNISED_PROFILES.contains(&p.as_str()))
            .unwrap_or_else(|| "latest".to_string());

        let rule_overrides = raw
            .rule_overrides
            .iter()
            .filter_map(|(id, sev)| {
                Severity::parse(sev).map(|severity| (id.to_ascii_uppercase(), severity))
            })
            .collect();

        let unity_api_surface = match raw.unity_api_surface.as_deref() {
            Some("custom-stubs") => UnityApiSurface::CustomStubs,
            Some("none") => UnityApiSurface::None,
            Some("bundled-stubs") => UnityApiSurface::BundledStubs,
            Some(_) | None => UnityApiSurface::BundledStubs,
        };

        // Only honoured when the surface is custom-stubs; a path supplied
        // alongside any other surface is a nonsensical combination and is
        // dropped per the resolver's normalisation contract.
        let custom_stub_path = if unity_api_surface == UnityApiSurface::CustomStubs {
            raw.custom_stub_path
                .as_deref()
                .map(|p| resolve_path(p, base_dir))
        } else {
            None
        };

        let telemetry = match raw.telemetry.as_deref() {
            Some("off") => Telemetry::Off,
            Some("minimal") => Telemetry::Minimal,
            _ => Telemetry::Minimal,
        };
        let telemetry = if std::env::var("UDONSHARP_LINTER_TELEMETRY").as_deref() == Ok("0") {
            Telemetry::Off
        } else {
            telemetry
        };

        let policy_pack_paths = raw
            .policy_pack_paths
            .iter()
            .map(|p| resolve_path(p, base_dir))
            .collect();

        Self {
            profile,
            rule_overrides,
            unity_api_surface,
            custom_stub_path,
            allow_ref_out: raw.allow_ref_out.unwrap_or(false),
            code_actions_enabled: raw.code_actions_enabled.unwrap_or(false),
            telemetry,
            policy_pack_paths,
        }
    }

    /// Whether references must be rebuilt when moving from `prior` to `self`.
    pub fn references_changed(&self, prior: &Settings) -> bool {
        self.unity_api_surface != prior.unity_api_surface
            || self.custom_stub_path != prior.custom_stub_path
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&RawSettings::default(), Path::new("."))
    }
}

fn resolve_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = if let Some(stripped) = raw.strip_prefix("~/") {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(stripped),
            Err(_) => PathBuf::from(raw),
        }
    } else {
        PathBuf::from(raw)
    };
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_falls_back_to_latest() {
        let raw = RawSettings {
            profile: Some("nonsense".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        assert_eq!(settings.profile, "latest");
    }

    #[test]
    fn rule_overrides_are_upper_cased_and_parsed() {
        let mut overrides = HashMap::new();
        overrides.insert("ush0043".to_string(), "off".to_string());
        let raw = RawSettings {
            rule_overrides: overrides,
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        assert_eq!(settings.rule_overrides.get("USH0043"), Some(&Severity::Hidden));
    }

    #[test]
    fn custom_stub_path_dropped_unless_surface_is_custom() {
        let raw = RawSettings {
            unity_api_surface: Some("bundled-stubs".to_string()),
            custom_stub_path: Some("/some/stubs".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        assert_eq!(settings.custom_stub_path, None);
    }

    #[test]
    fn custom_stub_path_resolved_relative_to_base_dir() {
        let raw = RawSettings {
            unity_api_surface: Some("custom-stubs".to_string()),
            custom_stub_path: Some("stubs".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        assert_eq!(settings.custom_stub_path, Some(PathBuf::from("/base/stubs")));
    }

    #[test]
    fn references_changed_detects_surface_switch() {
        let a = Settings::default();
        let mut b = a.clone();
        b.unity_api_surface = UnityApiSurface::None;
        assert!(b.references_changed(&a));
        assert!(!a.references_changed(&a));
    }
}
