//! Shared per-analysis context passed to every rule family, plus the small
//! helpers for turning a syntax node into a `Diagnostic` location.

use ush_core::cst::UshSyntaxNode;
use ush_core::diagnostics::{Diagnostic, Location, Severity, SourceMap};
use ush_core::settings::Settings;
use ush_core::workspace::{CompilationContext, Document};

/// Everything a rule family needs to analyse one document: its parsed tree,
/// the resolved settings for this session, and the compilation context it
/// was snapshotted against.
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub settings: &'a Settings,
    pub compilation: &'a CompilationContext,
    source_map: SourceMap,
}

impl<'a> RuleContext<'a> {
    pub fn new(document: &'a Document, settings: &'a Settings, compilation: &'a CompilationContext) -> Self {
        Self {
            document,
            settings,
            compilation,
            source_map: SourceMap::new(&document.text),
        }
    }

    pub fn root(&self) -> &UshSyntaxNode {
        &self.document.tree
    }

    pub fn uri(&self) -> &str {
        &self.document.uri
    }

    /// Location spanning `node`'s full text range within this document.
    pub fn location(&self, node: &UshSyntaxNode) -> Location {
        let range = node.text_range();
        let (start_line, start_column) = self.source_map.line_column(range.start().into());
        let (end_line, end_column) = self.source_map.line_column(range.end().into());
        Location::new(self.uri(), start_line, start_column, end_line, end_column)
    }

    pub fn synthetic_location(&self) -> Location {
        Location::synthetic(self.uri())
    }

    /// Builds a diagnostic at `node`'s location. Severity is filled in by
    /// the engine after policy resolution; rules report at `Error` as a
    /// placeholder that the engine always overwrites (see `engine::analyze`).
    pub fn diagnostic(&self, rule_id: &str, message: impl Into<String>, node: &UshSyntaxNode) -> Diagnostic {
        Diagnostic::new(rule_id, message, self.location(node), Severity::Error)
    }

    pub fn diagnostic_at(&self, rule_id: &str, message: impl Into<String>, location: Location) -> Diagnostic {
        Diagnostic::new(rule_id, message, location, Severity::Error)
    }
}
