//! Kestrel language adapter
//!
//! Supplies the language-specific half of identifier correction for
//! Kestrel: a lexer and error-tolerant parser producing `ks-syntax` trees,
//! and the [`LanguagePolicy`] answers the engine needs (which nodes are
//! name usages, where traversal must stop, how replacement tokens are
//! built).

mod lexer;
mod parser;

pub use parser::parse;

use ks_syntax::{LanguagePolicy, NodeId, SyntaxKind, SyntaxTree, TokenData, TokenId, TokenKind};

/// Kestrel language implementation
pub struct KestrelLanguage;

impl KestrelLanguage {
    /// Creates a new Kestrel language adapter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for KestrelLanguage {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePolicy for KestrelLanguage {
    fn language_name(&self) -> &'static str {
        "kestrel"
    }

    fn is_nameable_node(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        matches!(
            tree.node(node).kind,
            SyntaxKind::SimpleName | SyntaxKind::GenericName
        )
    }

    fn should_descend(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        // lambda bodies bind their own parameters; a diagnostic outside
        // the lambda must not reach through into them
        tree.node(node).kind != SyntaxKind::Lambda
    }

    fn should_spell_check(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        // the binder of a `let` declares a name rather than using one
        let Some(parent) = tree.node(node).parent else {
            return true;
        };
        if tree.node(parent).kind != SyntaxKind::Let {
            return true;
        }
        tree.child_nodes(parent).next() != Some(node)
    }

    fn is_word_token(&self, tree: &SyntaxTree, token: TokenId) -> bool {
        tree.token(token).kind == TokenKind::Ident
    }

    fn is_generic_node(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        tree.node(node).kind == SyntaxKind::GenericName
    }

    fn is_generic_token(&self, _tree: &SyntaxTree, _token: TokenId) -> Option<bool> {
        // a bare token outside any name node cannot reveal whether type
        // arguments follow it
        None
    }

    fn build_replacement_token(
        &self,
        tree: &SyntaxTree,
        token: TokenId,
        new_text: &str,
    ) -> TokenData {
        let original = tree.token(token);
        TokenData {
            kind: TokenKind::Ident,
            text: new_text.to_string(),
            span: original.span,
            leading: original.leading.clone(),
            trailing: original.trailing.clone(),
        }
    }
}
