//! CST builder for constructing green trees from tokens.
//!
//! Thin wrapper around rowan's `GreenNodeBuilder` with a `checkpoint`/`wrap`
//! pair so the parser can build left-recursive expression nodes (binary
//! operators, postfix chains) without knowing the wrapping node kind until
//! after the first operand has already been parsed.

use rowan::{Checkpoint, GreenNodeBuilder};

use super::tree::UshSyntaxNode;
use super::{CstToken, UshSyntaxKind};

pub struct CstBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
        }
    }

    /// Start a new node with the given kind. Must be matched with `finish_node`.
    pub fn start_node(&mut self, kind: UshSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    /// Marks a point to retroactively wrap with `wrap` once the kind of the
    /// enclosing node is known.
    pub fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    /// Starts a node of `kind` at `checkpoint`, enclosing everything emitted
    /// since that checkpoint was taken, then finishes it immediately.
    pub fn wrap(&mut self, checkpoint: Checkpoint, kind: UshSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
        self.builder.finish_node();
    }

    pub fn token(&mut self, kind: UshSyntaxKind, text: &str) {
        self.builder.token(kind.into(), text);
    }

    pub fn add_token(&mut self, token: &CstToken) {
        self.builder.token(token.kind.into(), &token.text);
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub fn finish(self) -> UshSyntaxNode {
        let green = self.builder.finish();
        UshSyntaxNode::new_root(green)
    }

    /// Build a node containing a single token.
    pub fn token_node(&mut self, node_kind: UshSyntaxKind, token_kind: UshSyntaxKind, text: &str) {
        self.start_node(node_kind);
        self.token(token_kind, text);
        self.finish_node();
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::lexer::lex_with_trivia;

    #[test]
    fn builds_nested_node() {
        let mut builder = CstBuilder::new();
        builder.start_node(UshSyntaxKind::Root);
        builder.start_node(UshSyntaxKind::ClassDecl);
        builder.token(UshSyntaxKind::ClassKw, "class");
        builder.token(UshSyntaxKind::Whitespace, " ");
        builder.token(UshSyntaxKind::Ident, "Foo");
        builder.finish_node();
        builder.finish_node();

        let root = builder.finish();
        assert_eq!(root.kind(), UshSyntaxKind::Root);
        let class = root.first_child().expect("class child");
        assert_eq!(class.kind(), UshSyntaxKind::ClassDecl);
        assert_eq!(class.text().to_string(), "class Foo");
    }

    #[test]
    fn checkpoint_wraps_retroactively() {
        let mut builder = CstBuilder::new();
        builder.start_node(UshSyntaxKind::Root);
        let checkpoint = builder.checkpoint();
        builder.token(UshSyntaxKind::IntLiteral, "1");
        builder.token(UshSyntaxKind::Plus, "+");
        builder.token(UshSyntaxKind::IntLiteral, "2");
        builder.wrap(checkpoint, UshSyntaxKind::BinaryExpr);
        builder.finish_node();

        let root = builder.finish();
        let binary = root.first_child().expect("binary child");
        assert_eq!(binary.kind(), UshSyntaxKind::BinaryExpr);
        assert_eq!(binary.text().to_string(), "1+2");
    }

    #[test]
    fn tokens_from_lexer_roundtrip_through_builder() {
        let (tokens, _) = lex_with_trivia("class Foo {}");
        let mut builder = CstBuilder::new();
        builder.start_node(UshSyntaxKind::Root);
        for tok in &tokens {
            if tok.kind == UshSyntaxKind::Eof {
                continue;
            }
            builder.add_token(tok);
        }
        builder.finish_node();
        let root = builder.finish();
        assert_eq!(root.text().to_string(), "class Foo {}");
    }
}
