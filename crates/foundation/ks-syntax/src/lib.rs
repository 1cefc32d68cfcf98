//! Syntax tree types shared across the interactive tooling layer
//!
//! Trees are arena-backed and immutable once built: editing operations such
//! as [`SyntaxTree::replace_token`] produce a new tree and leave the
//! original untouched, so a fix can hold onto its source snapshot and stay
//! idempotent. Node and token spans exclude trivia; the trivia text hangs
//! off each token so the full source round-trips through [`SyntaxTree::text`].
//!
//! Language-specific behavior (which node kinds are names, where traversal
//! may descend, how a replacement token is built) lives behind the
//! [`LanguagePolicy`] trait, with one implementation per supported language
//! under `crates/language-support/`.

use ks_span::Span;
use la_arena::{Arena, Idx};
use std::fmt;

/// Identifier for a node inside one [`SyntaxTree`]
pub type NodeId = Idx<NodeData>;

/// Identifier for a token inside one [`SyntaxTree`]
pub type TokenId = Idx<TokenData>;

/// Language-independent node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of the syntax tree
    Root,
    /// Plain identifier usage, e.g. `console`
    SimpleName,
    /// Identifier usage with type arguments, e.g. `List<T>`
    GenericName,
    /// The `<...>` argument list of a generic name
    TypeArgs,
    /// Member access, e.g. `recv.field`
    MemberAccess,
    /// Call expression
    Call,
    /// Call argument list
    ArgList,
    /// Lambda parameter list
    ParamList,
    /// Lambda expression
    Lambda,
    /// `let` binding
    Let,
    /// Literal value
    Literal,
    /// Error-recovery container for unparseable input
    Error,
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::SimpleName => "simple_name",
            Self::GenericName => "generic_name",
            Self::TypeArgs => "type_args",
            Self::MemberAccess => "member_access",
            Self::Call => "call",
            Self::ArgList => "arg_list",
            Self::ParamList => "param_list",
            Self::Lambda => "lambda",
            Self::Let => "let",
            Self::Literal => "literal",
            Self::Error => "error",
        };
        write!(formatter, "{name}")
    }
}

/// Lexical token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier
    Ident,
    /// Reserved word
    Keyword,
    /// Numeric or string literal
    Literal,
    /// Punctuation or operator
    Punct,
}

/// A token: the smallest lexical unit, with its surrounding trivia
///
/// `span` covers the token text only. `leading` and `trailing` hold the
/// raw trivia text (whitespace, comments) attached to this token; edits
/// that swap a token preserve both sides untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    /// Token classification
    pub kind: TokenKind,
    /// Source text of the token itself
    pub text: String,
    /// Location of `text` in the source
    pub span: Span,
    /// Trivia immediately before the token
    pub leading: String,
    /// Trivia immediately after the token
    pub trailing: String,
}

/// A child slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxElement {
    /// Child node
    Node(NodeId),
    /// Child token
    Token(TokenId),
}

/// A typed container of child tokens and nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Node classification
    pub kind: SyntaxKind,
    /// Trivia-free extent: the hull of all descendant token spans
    pub span: Span,
    /// Enclosing node, `None` for the root
    pub parent: Option<NodeId>,
    /// Children in source order
    pub children: Vec<SyntaxElement>,
}

/// An immutable syntax tree for one source text
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Arena<NodeData>,
    tokens: Arena<TokenData>,
    root: NodeId,
}

impl SyntaxTree {
    /// Root node of the tree
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node data by id
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    /// Token data by id
    pub fn token(&self, id: TokenId) -> &TokenData {
        &self.tokens[id]
    }

    /// Child nodes of `node`, in source order
    pub fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node].children.iter().filter_map(|child| match child {
            SyntaxElement::Node(id) => Some(*id),
            SyntaxElement::Token(_) => None,
        })
    }

    /// Finds the shallowest node whose span equals `span` exactly
    ///
    /// Exact matching is deliberate: diagnostic locations are produced
    /// against the same tree version, so a near-miss means the caller
    /// holds a stale tree and must not receive a node.
    pub fn find_node_at(&self, span: Span) -> Option<NodeId> {
        self.find_node_in(self.root, span)
    }

    fn find_node_in(&self, node: NodeId, span: Span) -> Option<NodeId> {
        let data = &self.nodes[node];
        if data.span == span {
            return Some(node);
        }
        if !data.span.contains_span(span) {
            return None;
        }
        for child in self.child_nodes(node) {
            if self.nodes[child].span.contains_span(span) {
                if let Some(found) = self.find_node_in(child, span) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Finds the token whose span equals `span` exactly
    pub fn find_token_at(&self, span: Span) -> Option<TokenId> {
        self.tokens()
            .find(|(_, token)| token.span == span)
            .map(|(id, _)| id)
    }

    /// All tokens in source order
    pub fn tokens(&self) -> impl Iterator<Item = (TokenId, &TokenData)> + '_ {
        self.tokens.iter()
    }

    /// First token under `node` in source order, the node's "leading" token
    pub fn first_token(&self, node: NodeId) -> Option<TokenId> {
        for child in &self.nodes[node].children {
            match child {
                SyntaxElement::Token(id) => return Some(*id),
                SyntaxElement::Node(id) => {
                    if let Some(token) = self.first_token(*id) {
                        return Some(token);
                    }
                }
            }
        }
        None
    }

    /// Reconstructs the full source text, trivia included
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (_, token) in self.tokens.iter() {
            out.push_str(&token.leading);
            out.push_str(&token.text);
            out.push_str(&token.trailing);
        }
        out
    }

    /// Returns a new tree with `target` swapped for `replacement`
    ///
    /// Every span in the new tree is recomputed from scratch, so a
    /// replacement of different length shifts everything downstream and
    /// re-hulls the ancestor nodes. The receiver is left untouched.
    pub fn replace_token(&self, target: TokenId, replacement: TokenData) -> SyntaxTree {
        let mut nodes = self.nodes.clone();
        let mut tokens = self.tokens.clone();
        tokens[target] = replacement;

        let mut cursor = 0u32;
        relayout(&mut nodes, &mut tokens, self.root, &mut cursor);

        SyntaxTree {
            nodes,
            tokens,
            root: self.root,
        }
    }
}

/// Walks `node` in source order, assigning token spans from a running
/// cursor and node spans as the hull of non-empty child spans.
fn relayout(
    nodes: &mut Arena<NodeData>,
    tokens: &mut Arena<TokenData>,
    node: NodeId,
    cursor: &mut u32,
) -> Span {
    let children = nodes[node].children.clone();
    let mut hull: Option<Span> = None;

    for child in children {
        let child_span = match child {
            SyntaxElement::Token(id) => {
                let token = &mut tokens[id];
                *cursor += token.leading.len() as u32;
                let start = *cursor;
                *cursor += token.text.len() as u32;
                token.span = Span::new(start, *cursor);
                *cursor += token.trailing.len() as u32;
                token.span
            }
            SyntaxElement::Node(id) => relayout(nodes, tokens, id, cursor),
        };
        if !child_span.is_empty() {
            hull = Some(hull.map_or(child_span, |span| span.cover(child_span)));
        }
    }

    let span = hull.unwrap_or_else(|| Span::empty(*cursor));
    nodes[node].span = span;
    span
}

/// Incremental builder for a [`SyntaxTree`]
///
/// Tokens must be pushed in source order; spans are assigned from a running
/// cursor as `leading`/`text`/`trailing` are consumed. Nodes take ownership
/// of already-built children and compute their span as the children's hull.
pub struct TreeBuilder {
    nodes: Arena<NodeData>,
    tokens: Arena<TokenData>,
    cursor: u32,
}

impl TreeBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            tokens: Arena::new(),
            cursor: 0,
        }
    }

    /// Appends a token at the current cursor position
    pub fn token(&mut self, kind: TokenKind, leading: &str, text: &str, trailing: &str) -> TokenId {
        self.cursor += leading.len() as u32;
        let start = self.cursor;
        self.cursor += text.len() as u32;
        let span = Span::new(start, self.cursor);
        self.cursor += trailing.len() as u32;

        self.tokens.alloc(TokenData {
            kind,
            text: text.to_string(),
            span,
            leading: leading.to_string(),
            trailing: trailing.to_string(),
        })
    }

    /// Wraps previously built children into a node
    pub fn node(&mut self, kind: SyntaxKind, children: Vec<SyntaxElement>) -> NodeId {
        let mut hull: Option<Span> = None;
        for child in &children {
            let child_span = match child {
                SyntaxElement::Token(id) => self.tokens[*id].span,
                SyntaxElement::Node(id) => self.nodes[*id].span,
            };
            if !child_span.is_empty() {
                hull = Some(hull.map_or(child_span, |span| span.cover(child_span)));
            }
        }
        let span = hull.unwrap_or_else(|| Span::empty(self.cursor));

        let id = self.nodes.alloc(NodeData {
            kind,
            span,
            parent: None,
            children,
        });
        for child in self.nodes[id].children.clone() {
            if let SyntaxElement::Node(child_id) = child {
                self.nodes[child_id].parent = Some(id);
            }
        }
        id
    }

    /// Consumes the builder, producing the finished tree
    #[must_use]
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            tokens: self.tokens,
            root,
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Language-specific capability hooks consumed by the tooling layer
///
/// One implementation per source language supplies the closed set of
/// decisions the core cannot make generically: which node kinds are name
/// usages, which subtrees introduce scopes the traversal must not enter,
/// which names are worth spell-checking, and how a replacement token is
/// constructed in that language.
pub trait LanguagePolicy: Send + Sync {
    /// Name of the language
    fn language_name(&self) -> &'static str;

    /// Whether `node` is an identifier usage the engine can correct
    fn is_nameable_node(&self, tree: &SyntaxTree, node: NodeId) -> bool;

    /// Whether traversal may enter the children of `node`
    fn should_descend(&self, tree: &SyntaxTree, node: NodeId) -> bool;

    /// Whether a nameable `node` should be spell-checked at all
    /// (declarations and already-validated names are excluded here)
    fn should_spell_check(&self, tree: &SyntaxTree, node: NodeId) -> bool;

    /// Whether `token` is an identifier-like word
    fn is_word_token(&self, tree: &SyntaxTree, token: TokenId) -> bool;

    /// Whether the name usage at `node` carries type arguments
    fn is_generic_node(&self, tree: &SyntaxTree, node: NodeId) -> bool;

    /// Genericity of a bare token, `None` when the token alone cannot
    /// determine it
    fn is_generic_token(&self, tree: &SyntaxTree, token: TokenId) -> Option<bool>;

    /// Builds the token that replaces `token` with `new_text`, keeping
    /// the original's trivia
    fn build_replacement_token(
        &self,
        tree: &SyntaxTree,
        token: TokenId,
        new_text: &str,
    ) -> TokenData;
}
