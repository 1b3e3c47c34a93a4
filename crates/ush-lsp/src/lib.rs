//! Language Server Protocol front end for the UdonSharp lint engine.
//!
//! Wires `ush_core`'s workspace/policy/settings model and `ush_rules`'s
//! engine to a `tower_lsp::LanguageServer` implementation: document sync,
//! diagnostic publication, and the three custom session methods described
//! for the session lifecycle.

pub mod server;

pub use server::Backend;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
