//! Collaborator interfaces supplied by the tooling host
//!
//! The engine never owns a parser, a semantic analyzer, or a completion
//! engine. It consumes all three through the traits here, against one
//! immutable document snapshot per request. Every method is asynchronous:
//! the host may hit disk, a database, or a background computation before
//! answering, and the engine must be suspendable at each of those points.

use async_trait::async_trait;
use ks_syntax::{NodeId, SyntaxTree};
use std::sync::Arc;

/// Handle to one version of one source document
///
/// The tree and model returned by a single handle must describe the same
/// document version; the engine matches diagnostic spans against them
/// exactly and offers no fix when they disagree.
#[async_trait]
pub trait Document: Send + Sync {
    /// Syntax tree snapshot for this document version
    async fn syntax_tree(&self) -> anyhow::Result<Arc<SyntaxTree>>;

    /// Semantic model snapshot paired with [`Document::syntax_tree`]
    async fn semantic_model(&self) -> anyhow::Result<Arc<dyn SemanticModel>>;

    /// Completion engine scoped to this document
    async fn completion_provider(&self) -> anyhow::Result<Arc<dyn CompletionProvider>>;
}

/// Semantic-analysis questions the engine asks
#[async_trait]
pub trait SemanticModel: Send + Sync {
    /// Symbol bound to the name usage at `node`, `None` when the name
    /// does not resolve
    async fn resolve_symbol(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
    ) -> anyhow::Result<Option<SymbolInfo>>;
}

/// What a name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Declared name of the symbol
    pub name: String,
    /// Coarse classification
    pub kind: SymbolKind,
}

/// Coarse symbol classification, enough to describe a resolution result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Local binding or parameter
    Variable,
    /// Callable
    Function,
    /// Type or type alias
    Type,
    /// Namespace-like container
    Module,
}

/// Completion engine questions the engine asks
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Names in scope at `offset`, honoring `options`
    async fn candidates(
        &self,
        offset: u32,
        options: &CompletionOptions,
    ) -> anyhow::Result<Vec<CompletionItem>>;

    /// Final text inserted when `item` is accepted
    ///
    /// May differ from the filter text, for example when the target name
    /// needs escaping at the use site. Resolving it can be expensive, so
    /// the engine only asks for candidates that already passed scoring.
    async fn insertion_text(&self, item: &CompletionItem) -> anyhow::Result<String>;
}

/// One entry of a completion listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Text the completion engine matches typing against
    pub filter_text: String,
    /// Entry classification
    pub kind: CompletionItemKind,
    /// Number of type parameters the completed symbol takes
    pub type_arity: u32,
}

impl CompletionItem {
    /// Plain symbol entry with no type parameters
    #[must_use]
    pub fn symbol(filter_text: impl Into<String>) -> Self {
        Self {
            filter_text: filter_text.into(),
            kind: CompletionItemKind::Symbol,
            type_arity: 0,
        }
    }

    /// Symbol entry taking `type_arity` type parameters
    #[must_use]
    pub fn generic_symbol(filter_text: impl Into<String>, type_arity: u32) -> Self {
        Self {
            filter_text: filter_text.into(),
            kind: CompletionItemKind::Symbol,
            type_arity,
        }
    }

    /// Whether this entry names a parameterized symbol
    #[must_use]
    pub const fn is_generic(&self) -> bool {
        self.type_arity > 0
    }
}

/// Kinds of completion entries the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    /// A resolvable name in scope
    Symbol,
    /// A language keyword
    Keyword,
    /// A template that expands to a code snippet
    Snippet,
}

/// Knobs forwarded to the completion engine when gathering candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Drop template/snippet entries from the listing
    pub suppress_snippets: bool,
}
