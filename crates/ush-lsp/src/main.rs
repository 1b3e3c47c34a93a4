//! `udonsharp-lint-server` binary entry point: boots file-backed logging,
//! wires the three custom session methods onto the `tower_lsp` service, and
//! serves over stdio.

use std::path::PathBuf;

use tower_lsp::{LspService, Server};

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() {
    let base_dir = executable_dir();
    let logs_dir = base_dir.join("logs");

    if std::fs::create_dir_all(&logs_dir).is_err() {
        let _ = std::fs::write("fatal.log", "could not create logs directory\n");
        std::process::exit(1);
    }
    let _guard = ush_core::init_tracing(&logs_dir, "server.log");

    tracing::info!(version = ush_lsp::VERSION, "udonsharp-lint-server starting");

    let (service, socket) = LspService::build(|client| ush_lsp::Backend::new(client, base_dir.clone()))
        .custom_method("udonsharp/rules/list", ush_lsp::Backend::rules_list)
        .custom_method("udonsharp/rules/documentation", ush_lsp::Backend::rules_documentation)
        .custom_method("udonsharp/server/status", ush_lsp::Backend::server_status)
        .custom_method("udonsharp/status", ush_lsp::Backend::server_status)
        .finish();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    Server::new(stdin, stdout, socket).serve(service).await;
}
