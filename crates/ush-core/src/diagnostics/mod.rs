//! Diagnostic model: severities, source locations, and the diagnostic value
//! emitted by rule implementations.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic, after profile and user-override resolution.
///
/// Wire forms `{error, warn|warning, info|information, hidden|off}` all
/// normalise to one of these four. `Hidden` means the rule still ran and the
/// finding still exists, it is simply not surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Hidden,
    Information,
    Warning,
    Error,
}

impl Severity {
    /// Parse a wire-form severity string, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warn" | "warning" => Some(Severity::Warning),
            "info" | "information" => Some(Severity::Information),
            "hidden" | "off" => Some(Severity::Hidden),
            _ => None,
        }
    }

    /// Canonical lower-case wire form.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "information",
            Severity::Hidden => "hidden",
        }
    }

    /// LSP `DiagnosticSeverity` numeric encoding: Error=1, Warning=2,
    /// Information=3, Hidden is reported as Hint (4) so it still round-trips
    /// through clients that do not understand "off" severities.
    pub fn lsp_code(self) -> i32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Information => 3,
            Severity::Hidden => 4,
        }
    }
}

impl Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Severity::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid severity '{raw}'")))
    }
}

/// A location within a document, `0,0`-`0,0` when the finding is synthetic
/// (no precise span, e.g. a whole-type finding).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub uri: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn synthetic(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            start_line: 0,
            start_column: 0,
            end_line: 0,
            end_column: 0,
        }
    }

    pub fn new(uri: impl Into<String>, start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            uri: uri.into(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

/// Converts byte offsets in a document's text into line/column pairs.
///
/// Lines and columns are both zero-based, matching LSP's `Position`.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<u32>,
}

impl SourceMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Binary search the precomputed line-start table for the line containing `offset`.
    pub fn line_column(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        (line as u32, offset - line_start)
    }
}

/// A single finding. `source` is always `"UdonSharp"` per the publisher contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: String,
    pub message: String,
    pub location: Location,
    pub severity: Severity,
    pub source: &'static str,
}

impl Diagnostic {
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>, location: Location, severity: Severity) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            location,
            severity,
            source: "UdonSharp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_wire_aliases() {
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::parse("off"), Some(Severity::Hidden));
        assert_eq!(Severity::parse("info"), Some(Severity::Information));
        assert_eq!(Severity::parse("bogus"), None);
    }

    #[test]
    fn severity_ordering_matches_escalation() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Information);
        assert!(Severity::Information > Severity::Hidden);
    }

    #[test]
    fn source_map_finds_line_column() {
        let map = SourceMap::new("abc\ndef\nghi");
        assert_eq!(map.line_column(0), (0, 0));
        assert_eq!(map.line_column(4), (1, 0));
        assert_eq!(map.line_column(9), (2, 1));
    }
}
