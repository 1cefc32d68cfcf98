//! Shared in-memory tooling host for the spell-check integration tests
//!
//! One [`TestHost`] stands in for the whole IDE side of a request: it
//! parses a Kestrel source once, resolves names against a fixed scope,
//! and answers completion queries from the same scope. Builders keep the
//! individual tests down to a source string plus the symbols in play.

#![allow(dead_code)]

use async_trait::async_trait;
use indexmap::IndexMap;
use ks_spellcheck::{
    CancellationToken, CompletionItem, CompletionItemKind, CompletionOptions, CompletionProvider,
    Document, SemanticModel, Span, SymbolInfo, SymbolKind,
};
use ks_syntax::{NodeId, SyntaxKind, SyntaxTree};
use lang_kestrel::parse;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// In-memory document with a fixed symbol scope
pub struct TestHost {
    tree: Arc<SyntaxTree>,
    model: Arc<ScopeModel>,
    completions: Arc<ScopeCompletions>,
}

impl TestHost {
    /// The parsed tree this host serves
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Span of the first token whose text is `text`
    pub fn token_span(&self, text: &str) -> Span {
        self.tree
            .tokens()
            .find(|(_, token)| token.text == text)
            .map(|(_, token)| token.span)
            .unwrap_or_else(|| panic!("no token '{text}' in source"))
    }

    /// Span of the first node of `kind`, depth first
    pub fn node_span(&self, kind: SyntaxKind) -> Span {
        find_node_of_kind(&self.tree, kind)
            .map(|node| self.tree.node(node).span)
            .unwrap_or_else(|| panic!("no {kind} node in source"))
    }

    /// Resolves the first name node spelled `text` in `tree` against this
    /// host's scope, the way the engine's resolution gate would
    pub async fn resolve_name(&self, tree: &SyntaxTree, text: &str) -> Option<SymbolInfo> {
        let node = find_name_node(tree, text)?;
        self.model
            .resolve_symbol(tree, node)
            .await
            .expect("scope model never fails")
    }
}

#[async_trait]
impl Document for TestHost {
    async fn syntax_tree(&self) -> anyhow::Result<Arc<SyntaxTree>> {
        Ok(Arc::clone(&self.tree))
    }

    async fn semantic_model(&self) -> anyhow::Result<Arc<dyn SemanticModel>> {
        // clone as the concrete Arc; the result unsizes at the return type
        Ok(self.model.clone())
    }

    async fn completion_provider(&self) -> anyhow::Result<Arc<dyn CompletionProvider>> {
        Ok(self.completions.clone())
    }
}

struct ScopeEntry {
    kind: SymbolKind,
    type_arity: u32,
}

/// Builds a [`TestHost`] from a source string and scope description
pub struct TestHostBuilder {
    source: String,
    scope: IndexMap<String, ScopeEntry>,
    extra_items: Vec<CompletionItem>,
    insertion_overrides: FxHashMap<String, String>,
}

impl TestHostBuilder {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            scope: IndexMap::new(),
            extra_items: Vec::new(),
            insertion_overrides: FxHashMap::default(),
        }
    }

    /// Adds a resolvable symbol that also shows up in completion listings
    #[must_use]
    pub fn symbol(mut self, name: &str, kind: SymbolKind) -> Self {
        self.scope
            .insert(name.to_string(), ScopeEntry { kind, type_arity: 0 });
        self
    }

    /// Adds a resolvable symbol taking `type_arity` type parameters
    #[must_use]
    pub fn generic_symbol(mut self, name: &str, kind: SymbolKind, type_arity: u32) -> Self {
        self.scope
            .insert(name.to_string(), ScopeEntry { kind, type_arity });
        self
    }

    /// Adds a completion entry that does not resolve anywhere, matching
    /// listings that offer names not usable at the queried position
    #[must_use]
    pub fn completion(mut self, item: CompletionItem) -> Self {
        self.extra_items.push(item);
        self
    }

    /// Makes accepting the candidate filtered as `filter` insert `text`
    #[must_use]
    pub fn insertion_override(mut self, filter: &str, text: &str) -> Self {
        self.insertion_overrides
            .insert(filter.to_string(), text.to_string());
        self
    }

    pub fn build(self) -> TestHost {
        let tree = Arc::new(parse(&self.source));
        let mut symbols = FxHashMap::default();
        let mut items = Vec::new();
        for (name, entry) in &self.scope {
            symbols.insert(
                name.clone(),
                SymbolInfo {
                    name: name.clone(),
                    kind: entry.kind,
                },
            );
            items.push(CompletionItem {
                filter_text: name.clone(),
                kind: CompletionItemKind::Symbol,
                type_arity: entry.type_arity,
            });
        }
        items.extend(self.extra_items);
        TestHost {
            tree,
            model: Arc::new(ScopeModel { symbols }),
            completions: Arc::new(ScopeCompletions {
                items,
                insertion_overrides: self.insertion_overrides,
            }),
        }
    }
}

/// Resolves name nodes by their leading token text
struct ScopeModel {
    symbols: FxHashMap<String, SymbolInfo>,
}

#[async_trait]
impl SemanticModel for ScopeModel {
    async fn resolve_symbol(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
    ) -> anyhow::Result<Option<SymbolInfo>> {
        let Some(token) = tree.first_token(node) else {
            return Ok(None);
        };
        Ok(self.symbols.get(&tree.token(token).text).cloned())
    }
}

/// Serves the scope as a completion listing, in registration order
struct ScopeCompletions {
    items: Vec<CompletionItem>,
    insertion_overrides: FxHashMap<String, String>,
}

#[async_trait]
impl CompletionProvider for ScopeCompletions {
    async fn candidates(
        &self,
        _offset: u32,
        options: &CompletionOptions,
    ) -> anyhow::Result<Vec<CompletionItem>> {
        let mut items = self.items.clone();
        if options.suppress_snippets {
            items.retain(|item| item.kind != CompletionItemKind::Snippet);
        }
        Ok(items)
    }

    async fn insertion_text(&self, item: &CompletionItem) -> anyhow::Result<String> {
        Ok(self
            .insertion_overrides
            .get(&item.filter_text)
            .cloned()
            .unwrap_or_else(|| item.filter_text.clone()))
    }
}

/// Host wrapper that fires its cancellation token in the middle of a
/// request, from inside the first insertion-text lookup
pub struct CancellingHost {
    inner: TestHost,
    cancel: CancellationToken,
}

impl CancellingHost {
    pub fn new(inner: TestHost, cancel: CancellationToken) -> Self {
        Self { inner, cancel }
    }
}

#[async_trait]
impl Document for CancellingHost {
    async fn syntax_tree(&self) -> anyhow::Result<Arc<SyntaxTree>> {
        self.inner.syntax_tree().await
    }

    async fn semantic_model(&self) -> anyhow::Result<Arc<dyn SemanticModel>> {
        self.inner.semantic_model().await
    }

    async fn completion_provider(&self) -> anyhow::Result<Arc<dyn CompletionProvider>> {
        let completions: Arc<dyn CompletionProvider> = Arc::new(CancellingCompletions {
            inner: Arc::clone(&self.inner.completions),
            cancel: self.cancel.clone(),
        });
        Ok(completions)
    }
}

struct CancellingCompletions {
    inner: Arc<ScopeCompletions>,
    cancel: CancellationToken,
}

#[async_trait]
impl CompletionProvider for CancellingCompletions {
    async fn candidates(
        &self,
        offset: u32,
        options: &CompletionOptions,
    ) -> anyhow::Result<Vec<CompletionItem>> {
        self.inner.candidates(offset, options).await
    }

    async fn insertion_text(&self, item: &CompletionItem) -> anyhow::Result<String> {
        self.cancel.cancel();
        self.inner.insertion_text(item).await
    }
}

/// Host whose completion engine is unreachable
pub struct FailingHost {
    inner: TestHost,
}

impl FailingHost {
    pub fn new(inner: TestHost) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Document for FailingHost {
    async fn syntax_tree(&self) -> anyhow::Result<Arc<SyntaxTree>> {
        self.inner.syntax_tree().await
    }

    async fn semantic_model(&self) -> anyhow::Result<Arc<dyn SemanticModel>> {
        self.inner.semantic_model().await
    }

    async fn completion_provider(&self) -> anyhow::Result<Arc<dyn CompletionProvider>> {
        Err(anyhow::anyhow!("completion engine offline"))
    }
}

/// First node of `kind` in depth-first order
pub fn find_node_of_kind(tree: &SyntaxTree, kind: SyntaxKind) -> Option<NodeId> {
    find_kind_in(tree, tree.root(), kind)
}

fn find_kind_in(tree: &SyntaxTree, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
    if tree.node(node).kind == kind {
        return Some(node);
    }
    tree.child_nodes(node)
        .find_map(|child| find_kind_in(tree, child, kind))
}

/// First name node whose leading token is spelled `text`
pub fn find_name_node(tree: &SyntaxTree, text: &str) -> Option<NodeId> {
    find_name_in(tree, tree.root(), text)
}

fn find_name_in(tree: &SyntaxTree, node: NodeId, text: &str) -> Option<NodeId> {
    let data = tree.node(node);
    if matches!(data.kind, SyntaxKind::SimpleName | SyntaxKind::GenericName) {
        if let Some(token) = tree.first_token(node) {
            if tree.token(token).text == text {
                return Some(node);
            }
        }
    }
    tree.child_nodes(node)
        .find_map(|child| find_name_in(tree, child, text))
}
