//! Locating and filtering name occurrences under a diagnostic span

use ks_span::Span;
use ks_syntax::{LanguagePolicy, NodeId, SyntaxTree, TokenId};

/// Names shorter than this are never spell-checked; corrections on very
/// short names are mostly noise while the user is still typing
pub(crate) const MIN_NAME_LEN: usize = 3;

/// One identifier occurrence pulled out from under a diagnostic span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOccurrence {
    /// Found through a nameable node; must pass the resolution gate
    /// before any candidate work happens
    Node {
        /// The nameable node itself
        node: NodeId,
        /// Leading token carrying the name text
        token: TokenId,
        /// The name text
        text: String,
        /// Whether the usage carries type arguments
        generic: bool,
    },
    /// Bare token with no enclosing name node; the diagnostic itself
    /// vouches that the name is unresolved, so no gate applies
    Token {
        /// The word token
        token: TokenId,
        /// The name text
        text: String,
        /// Arity class, `None` when the token alone cannot determine it
        generic: Option<bool>,
    },
}

impl NameOccurrence {
    /// Token carrying the misspelled text
    #[must_use]
    pub fn token(&self) -> TokenId {
        match self {
            Self::Node { token, .. } | Self::Token { token, .. } => *token,
        }
    }

    /// The misspelled text itself
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Node { text, .. } | Self::Token { text, .. } => text,
        }
    }

    /// Arity class of the occurrence, when determinable
    #[must_use]
    pub fn generic(&self) -> Option<bool> {
        match self {
            Self::Node { generic, .. } => Some(*generic),
            Self::Token { generic, .. } => *generic,
        }
    }

    /// Node that still has to pass the resolution gate
    #[must_use]
    pub fn gated_node(&self) -> Option<NodeId> {
        match self {
            Self::Node { node, .. } => Some(*node),
            Self::Token { .. } => None,
        }
    }
}

/// Finds every spell-checkable occurrence at `span`
///
/// A node whose span equals `span` exactly starts a pruned descent over
/// its subtree; failing that, a token with that exact span is taken on
/// its own. Anything less than an exact match means the diagnostic came
/// from a different tree version, and nothing is returned.
pub fn locate(tree: &SyntaxTree, span: Span, policy: &dyn LanguagePolicy) -> Vec<NameOccurrence> {
    if let Some(node) = tree.find_node_at(span) {
        let mut found = Vec::new();
        collect_names(tree, policy, node, &mut found);
        return found;
    }

    let Some(token) = tree.find_token_at(span) else {
        return Vec::new();
    };
    if !policy.is_word_token(tree, token) {
        return Vec::new();
    }
    let text = tree.token(token).text.clone();
    if text.chars().count() < MIN_NAME_LEN {
        return Vec::new();
    }
    let generic = policy.is_generic_token(tree, token);
    vec![NameOccurrence::Token {
        token,
        text,
        generic,
    }]
}

fn collect_names(
    tree: &SyntaxTree,
    policy: &dyn LanguagePolicy,
    node: NodeId,
    found: &mut Vec<NameOccurrence>,
) {
    if policy.is_nameable_node(tree, node) && policy.should_spell_check(tree, node) {
        if let Some(token) = tree.first_token(node) {
            let text = &tree.token(token).text;
            if text.chars().count() >= MIN_NAME_LEN {
                found.push(NameOccurrence::Node {
                    node,
                    token,
                    text: text.clone(),
                    generic: policy.is_generic_node(tree, node),
                });
            }
        }
    }
    if policy.should_descend(tree, node) {
        for child in tree.child_nodes(node) {
            collect_names(tree, policy, child, found);
        }
    }
}
