//! Concrete Syntax Tree (CST) for the UdonSharp C# subset.
//!
//! This module implements a lossless syntax tree using the Rowan library,
//! the same green/red tree pattern as a typical hand-rolled rowan-based
//! language frontend:
//!
//! - **Green tree**: immutable, position-independent storage, trivia
//!   (whitespace/comments) attached directly to tokens so the tree is
//!   lossless (`parse(source)` round-trips to `source` byte for byte).
//! - **Red tree**: parent-pointer view constructed on demand for traversal,
//!   exposed to rule implementations through the typed wrappers in [`ast`].
//!
//! The grammar only covers the subset of C# UdonSharp scripts are restricted
//! to use, but the lexer/parser accept full C# syntax so that rules which
//! detect *banned* constructs (e.g. USH0018 `is`, USH0020 `try`/`catch`) see
//! them rather than failing to parse.

mod builder;
mod language;
mod lexer;
mod parser;
mod syntax_kind;
mod tree;

pub mod ast;

pub use builder::CstBuilder;
pub use language::UshLanguage;
pub use lexer::{CstLexResult, CstToken, LexerError, lex_with_trivia};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use syntax_kind::UshSyntaxKind;
pub use tree::{UshSyntaxElement, UshSyntaxNode, UshSyntaxToken};

#[cfg(test)]
mod tests;
