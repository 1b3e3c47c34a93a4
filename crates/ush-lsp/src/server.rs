//! Backend implementing the Language Server Protocol front end: document
//! sync, diagnostic publication, and the three custom session methods.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result as RpcResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{info, warn};

use ush_core::diagnostics::{Diagnostic as UshDiagnostic, Severity};
use ush_core::policy::{PolicyPackLoader, PolicyRepository, RuleDefinition};
use ush_core::settings::{RawSettings, Settings};
use ush_core::workspace::WorkspaceManager;

const CONFIGURATION_SECTION: &str = "udonsharpLinter";

/// Owns the workspace, the atomically-reloadable policy catalogue, the
/// current settings snapshot, and one cancellation token per URI with an
/// analysis in flight. Mutations to settings and the in-flight map are
/// serialised behind their own locks; the workspace serialises its own
/// mutations internally.
pub struct Backend {
    client: Client,
    base_dir: PathBuf,
    workspace: WorkspaceManager,
    policy: PolicyRepository,
    settings: Mutex<Settings>,
    in_flight: Mutex<HashMap<String, CancellationToken>>,
}

impl Backend {
    pub fn new(client: Client, base_dir: PathBuf) -> Self {
        Self {
            client,
            workspace: WorkspaceManager::new(base_dir.clone()),
            base_dir,
            policy: PolicyRepository::empty(),
            settings: Mutex::new(Settings::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn bundled_policy_dir(&self) -> PathBuf {
        self.base_dir.join("PolicyPacks")
    }

    fn reload_policy(&self, settings: &Settings) {
        let rules = PolicyPackLoader::load(&self.bundled_policy_dir(), &settings.policy_pack_paths);
        self.policy.reload(rules);
    }

    fn current_settings(&self) -> Settings {
        self.settings.lock().expect("settings lock poisoned").clone()
    }

    fn replace_settings(&self, new_settings: Settings) -> Settings {
        let mut guard = self.settings.lock().expect("settings lock poisoned");
        std::mem::replace(&mut *guard, new_settings)
    }

    fn resolve_settings(&self, raw: &Value) -> Settings {
        let scoped = raw.get(CONFIGURATION_SECTION).cloned().unwrap_or(Value::Null);
        let parsed: RawSettings = serde_json::from_value(scoped).unwrap_or_default();
        Settings::resolve(&parsed, &self.base_dir)
    }

    /// Registers a fresh cancellation token for `uri`, cancelling whatever
    /// token was previously registered so an in-flight analysis for the
    /// same document stops before this one starts.
    fn begin_analysis(&self, uri: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let mut guard = self.in_flight.lock().expect("in-flight lock poisoned");
        if let Some(previous) = guard.insert(uri.to_string(), token.clone()) {
            previous.cancel();
        }
        token
    }

    fn end_analysis(&self, uri: &str) {
        let mut guard = self.in_flight.lock().expect("in-flight lock poisoned");
        guard.remove(uri);
    }

    async fn analyze_and_publish(&self, uri: Url, text: String) {
        let uri_string = uri.to_string();
        self.workspace.open_or_update(uri_string.clone(), text);

        let token = self.begin_analysis(&uri_string);
        let Some(snapshot) = self.workspace.snapshot(&uri_string) else {
            self.end_analysis(&uri_string);
            return;
        };
        let settings = self.current_settings();

        let diagnostics = ush_rules::analyze(
            &snapshot.document,
            &settings,
            &snapshot.compilation,
            &self.policy,
            &token,
        );
        self.end_analysis(&uri_string);

        if token.is_cancelled() {
            return;
        }

        let lsp_diagnostics = diagnostics.into_iter().map(to_lsp_diagnostic).collect();
        self.client.publish_diagnostics(uri, lsp_diagnostics, None).await;
    }

    async fn republish_all_open(&self) {
        for uri in self.workspace.open_uris() {
            let Some(document) = self.workspace.get(&uri) else { continue };
            if let Ok(parsed) = Url::parse(&uri) {
                self.analyze_and_publish(parsed, document.text.to_string()).await;
            }
        }
    }

    pub async fn rules_list(&self, _params: ()) -> RpcResult<Value> {
        let profile = self.current_settings().profile;
        let entries: Vec<RuleListEntry> = self
            .policy
            .all_rules()
            .into_iter()
            .map(|rule| RuleListEntry::from_definition(&rule, &profile))
            .collect();
        Ok(serde_json::to_value(entries).unwrap_or(Value::Null))
    }

    pub async fn rules_documentation(&self, params: RuleDocumentationParams) -> RpcResult<Value> {
        let locale = params.locale.unwrap_or_else(|| "en-US".to_string());
        let result = match self.policy.get_rule(&params.rule_id) {
            Some(rule) => RuleDocumentationResult {
                id: rule.id.clone(),
                locale: locale.clone(),
                title: rule.title.clone(),
                markdown: rule
                    .markdown_for_locale(&locale)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Documentation not available.".to_string()),
            },
            None => RuleDocumentationResult {
                id: params.rule_id.to_ascii_uppercase(),
                locale,
                title: String::new(),
                markdown: "Documentation not available.".to_string(),
            },
        };
        Ok(serde_json::to_value(result).unwrap_or(Value::Null))
    }

    pub async fn server_status(&self, _params: ()) -> RpcResult<Value> {
        let settings = self.current_settings();
        let rules = self.policy.all_rules();
        let disabled = rules
            .iter()
            .filter(|rule| self.policy.get_severity(&rule.id, &settings) == Severity::Hidden)
            .count();
        let status = ServerStatus {
            profile: settings.profile,
            disabled_rule_count: disabled,
            total_rule_count: rules.len(),
            server_version: crate::VERSION.to_string(),
        };
        Ok(serde_json::to_value(status).unwrap_or(Value::Null))
    }
}

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hidden => DiagnosticSeverity::HINT,
    }
}

fn to_lsp_diagnostic(diagnostic: UshDiagnostic) -> Diagnostic {
    let loc = &diagnostic.location;
    Diagnostic {
        range: Range {
            start: Position::new(loc.start_line, loc.start_column),
            end: Position::new(loc.end_line, loc.end_column),
        },
        severity: Some(to_lsp_severity(diagnostic.severity)),
        code: Some(NumberOrString::String(diagnostic.rule_id.clone())),
        source: Some(diagnostic.source.to_string()),
        message: diagnostic.message,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDocumentationParams {
    #[serde(rename = "ruleId")]
    rule_id: String,
    #[serde(default)]
    locale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct RuleDocumentationResult {
    id: String,
    locale: String,
    title: String,
    markdown: String,
}

#[derive(Debug, Clone, Serialize)]
struct RuleListEntry {
    id: String,
    title: String,
    category: String,
    #[serde(rename = "defaultSeverity")]
    default_severity: String,
    description: String,
    #[serde(rename = "helpLink", skip_serializing_if = "Option::is_none")]
    help_link: Option<String>,
    #[serde(rename = "hasCodeFix")]
    has_code_fix: bool,
    #[serde(rename = "profileSeverity")]
    profile_severity: HashMap<String, String>,
}

impl RuleListEntry {
    fn from_definition(rule: &RuleDefinition, _active_profile: &str) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            category: rule.category.clone(),
            default_severity: rule.default_severity.as_wire_str().to_string(),
            description: rule.message.clone(),
            help_link: rule.help_uri.clone(),
            has_code_fix: rule.has_code_fix,
            profile_severity: rule
                .profiles
                .iter()
                .map(|(profile, severity)| (profile.clone(), severity.as_wire_str().to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ServerStatus {
    profile: String,
    #[serde(rename = "disabledRuleCount")]
    disabled_rule_count: usize,
    #[serde(rename = "totalRuleCount")]
    total_rule_count: usize,
    #[serde(rename = "serverVersion")]
    server_version: String,
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> RpcResult<InitializeResult> {
        let raw: RawSettings = params
            .initialization_options
            .as_ref()
            .and_then(|opts| opts.get(CONFIGURATION_SECTION))
            .and_then(|scoped| serde_json::from_value(scoped.clone()).ok())
            .unwrap_or_default();
        let settings = Settings::resolve(&raw, &self.base_dir);

        self.reload_policy(&settings);
        self.workspace.initialise(&settings);
        self.replace_settings(settings);

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "udonsharp-lint-server".to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    will_save: Some(false),
                    will_save_wait_until: Some(false),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                })),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("udonsharp-lint-server initialized");
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.analyze_and_publish(params.text_document.uri, params.text_document.text).await;
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        let Some(change) = params.content_changes.pop() else { return };
        self.analyze_and_publish(params.text_document.uri, change.text).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let text = match params.text {
            Some(text) => text,
            None => match self.workspace.get(params.text_document.uri.as_str()) {
                Some(document) => document.text.to_string(),
                None => return,
            },
        };
        self.analyze_and_publish(params.text_document.uri, text).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri_string = params.text_document.uri.to_string();
        self.workspace.remove(&uri_string);
        {
            let mut guard = self.in_flight.lock().expect("in-flight lock poisoned");
            if let Some(token) = guard.remove(&uri_string) {
                token.cancel();
            }
        }
        self.client.publish_diagnostics(params.text_document.uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let new_settings = self.resolve_settings(&params.settings);
        let previous = self.replace_settings(new_settings.clone());

        self.reload_policy(&new_settings);
        if new_settings.references_changed(&previous) {
            self.workspace.initialise(&new_settings);
        }

        self.republish_all_open().await;
    }

    async fn shutdown(&self) -> RpcResult<()> {
        let tokens: Vec<CancellationToken> = {
            let guard = self.in_flight.lock().expect("in-flight lock poisoned");
            guard.values().cloned().collect()
        };
        for token in &tokens {
            token.cancel();
        }

        let deadline = Duration::from_secs(2);
        let waited = tokio::time::timeout(deadline, async {
            while !self.in_flight.lock().expect("in-flight lock poisoned").is_empty() {
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await;
        if waited.is_err() {
            warn!("shutdown timed out waiting for in-flight analyses to quiesce");
        }

        Ok(())
    }
}
