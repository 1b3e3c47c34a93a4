//! A single open document: its URI, current full text, and the last parsed
//! tree. A document not present in the workspace never produces
//! diagnostics — there is no notion of an "unopened but known" document.

use std::sync::Arc;

use crate::cst::{self, ParseError, UshSyntaxNode};

#[derive(Debug, Clone)]
pub struct Document {
    pub uri: String,
    pub text: Arc<str>,
    pub tree: UshSyntaxNode,
    pub parse_errors: Arc<[ParseError]>,
}

impl Document {
    pub fn new(uri: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let (tree, errors) = cst::parse(&text);
        Self {
            uri: uri.into(),
            text,
            tree,
            parse_errors: errors.into(),
        }
    }

    /// Replace this document's text in place, identity-preserving (the
    /// returned document carries the same URI; callers that hold a handle
    /// from `WorkspaceManager::open_or_update` receive the new one).
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self::new(self.uri.clone(), text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_parses_its_text() {
        let doc = Document::new("file:///A.cs", "public class A : UdonSharpBehaviour {\n}\n");
        assert!(doc.parse_errors.is_empty());
        assert_eq!(doc.tree.text().to_string(), doc.text.as_ref());
    }

    #[test]
    fn with_text_reparses_and_preserves_uri() {
        let doc = Document::new("file:///A.cs", "public class A {\n}\n");
        let updated = doc.with_text("public class B {\n}\n");
        assert_eq!(updated.uri, doc.uri);
        assert!(updated.text.contains("class B"));
    }
}
