//! Concrete rowan node/token aliases for the UshLanguage.

use super::UshLanguage;

pub type UshSyntaxNode = rowan::SyntaxNode<UshLanguage>;
pub type UshSyntaxToken = rowan::SyntaxToken<UshLanguage>;
pub type UshSyntaxElement = rowan::NodeOrToken<UshSyntaxNode, UshSyntaxToken>;
