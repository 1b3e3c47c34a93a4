//! UdonSharp Lint Core
//!
//! Syntax tree, policy/settings model, and workspace management shared by
//! the rule engine (`ush_rules`) and the LSP front end (`ush_lsp`). This
//! crate has no dependency on either — it only knows how to parse a
//! document and hold the state a rule engine needs to analyse one.

pub mod cst;
pub mod diagnostics;
pub mod policy;
pub mod reference;
pub mod settings;
pub mod workspace;

pub use diagnostics::{Diagnostic, Location, Severity, SourceMap};
pub use policy::{PolicyPackLoader, PolicyRepository, RuleDefinition};
pub use reference::{ReferenceAssembly, ReferenceResolver};
pub use settings::{RawSettings, Settings, Telemetry, UnityApiSurface};
pub use workspace::{CompilationContext, CompilationOptions, Document, DocumentSnapshot, WorkspaceManager};

/// Bootstraps a `tracing` subscriber writing structured lines to a file
/// under `logs/` rather than stdout/stderr, since the LSP stdio transport
/// must carry only JSON-RPC framing. Returns the guard that must be kept
/// alive for the life of the process to flush the non-blocking writer.
pub fn init_tracing(logs_dir: &std::path::Path, file_name: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let _ = std::fs::create_dir_all(logs_dir);
    let appender = tracing_appender::rolling::never(logs_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ush=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    guard
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
