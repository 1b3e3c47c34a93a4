//! End-to-end scenarios exercising the full pipeline a session actually
//! runs: bundled policy pack loaded from disk, settings resolved from a
//! default payload, and `ush_rules::analyze` dispatched against a
//! document, exactly as `Backend::analyze_and_publish` does it.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use ush_core::policy::{PolicyPackLoader, PolicyRepository};
use ush_core::settings::Settings;
use ush_core::workspace::{CompilationContext, Document};
use ush_rules::analyze;

fn bundled_policy_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("PolicyPacks")
}

fn rule_ids(source: &str) -> Vec<String> {
    let document = Document::new("file:///Test.cs", source);
    let settings = Settings::default();
    let compilation = CompilationContext::build(&settings, Path::new("."));
    let policy = PolicyRepository::new(PolicyPackLoader::load(&bundled_policy_dir(), &[]));
    analyze(&document, &settings, &compilation, &policy, &CancellationToken::new())
        .into_iter()
        .map(|d| d.rule_id)
        .collect()
}

#[test]
fn bundled_policy_pack_loads_all_forty_five_rules() {
    let policy = PolicyRepository::new(PolicyPackLoader::load(&bundled_policy_dir(), &[]));
    assert_eq!(policy.len(), 45);
}

#[test]
fn scenario_missing_network_event_target_reports_0001_and_0043() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    public void Foo() {}\n    void Bar() { SendCustomEvent(\"DoesNotExist\"); }\n}\n",
    );
    assert!(ids.contains(&"USH0001".to_string()));
    assert!(ids.contains(&"USH0043".to_string()));
}

#[test]
fn scenario_private_target_via_nameof_reports_0002_only() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    private void Secret() {}\n    void Bar() { SendCustomEvent(nameof(Secret)); }\n}\n",
    );
    assert!(ids.contains(&"USH0002".to_string()));
    assert!(!ids.contains(&"USH0001".to_string()));
    assert!(!ids.contains(&"USH0043".to_string()));
}

#[test]
fn scenario_network_callable_payload_mismatch_reports_0005() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    [NetworkCallable] public void Shoot(int n) {}\n    void Bar() { SendCustomNetworkEvent(this, NetworkEventTarget.All, nameof(Shoot), \"hello\"); }\n}\n",
    );
    assert!(ids.contains(&"USH0005".to_string()));
}

#[test]
fn scenario_unsupported_synced_type_reports_0008() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    [UdonSynced] Dictionary<string, int> map;\n}\n",
    );
    assert!(ids.contains(&"USH0008".to_string()));
}

#[test]
fn scenario_instantiate_as_and_try_catch_reports_0017_0019_0020() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    void Bar() {\n        var obj = Instantiate(prefab) as SomeComponent;\n        try {\n        } catch {\n        }\n    }\n}\n",
    );
    assert!(ids.contains(&"USH0017".to_string()));
    assert!(ids.contains(&"USH0019".to_string()));
    assert!(ids.contains(&"USH0020".to_string()));
}

#[test]
fn scenario_top_level_class_with_mismatched_file_name_reports_0044_and_0045() {
    let document = Document::new(
        "file:///Wrong.cs",
        "class MyBehaviour : UdonSharpBehaviour {\n}\n",
    );
    let settings = Settings::default();
    let compilation = CompilationContext::build(&settings, Path::new("."));
    let policy = PolicyRepository::new(PolicyPackLoader::load(&bundled_policy_dir(), &[]));
    let ids: Vec<String> = analyze(&document, &settings, &compilation, &policy, &CancellationToken::new())
        .into_iter()
        .map(|d| d.rule_id)
        .collect();
    assert!(ids.contains(&"USH0044".to_string()));
    assert!(ids.contains(&"USH0045".to_string()));
}

#[test]
fn numeric_aliasing_never_fires_0005_on_compatible_signature() {
    let ids = rule_ids(
        "class A : UdonSharpBehaviour {\n    [NetworkCallable] public void Shoot(System.Int32 n) {}\n    void Bar() { SendCustomNetworkEvent(this, NetworkEventTarget.All, nameof(Shoot), 5); }\n}\n",
    );
    assert!(!ids.contains(&"USH0005".to_string()));
}

#[test]
fn rule_override_off_eliminates_0043_everywhere() {
    let document = Document::new(
        "file:///Test.cs",
        "class A : UdonSharpBehaviour {\n    public void Foo() {}\n    void Bar() { SendCustomEvent(\"Foo\"); }\n}\n",
    );
    let mut raw_overrides = std::collections::HashMap::new();
    raw_overrides.insert("USH0043".to_string(), ush_core::diagnostics::Severity::Hidden);
    let mut settings = Settings::default();
    settings.rule_overrides = raw_overrides;
    let compilation = CompilationContext::build(&settings, Path::new("."));
    let policy = PolicyRepository::new(PolicyPackLoader::load(&bundled_policy_dir(), &[]));
    let ids: Vec<String> = analyze(&document, &settings, &compilation, &policy, &CancellationToken::new())
        .into_iter()
        .map(|d| d.rule_id)
        .collect();
    assert!(!ids.contains(&"USH0043".to_string()));
}
