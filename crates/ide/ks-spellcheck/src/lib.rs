//! "Did you mean" identifier correction for interactive tooling
//!
//! Given the span of a name-could-not-be-resolved diagnostic, the provider
//! walks the syntax tree under that span, confirms each qualifying name is
//! genuinely unresolved, scores the names actually in scope against the
//! misspelling, and packages the closest few as reversible edit actions.
//! Everything external (parsing, semantic resolution, completion listings)
//! is reached through host traits and an immutable per-request snapshot.
//!
//! # Architecture
//!
//! - **Extraction** ([`extract`]): exact-span location plus a pruned,
//!   policy-driven descent that yields the spell-checkable occurrences
//! - **Resolution gate**: node-path occurrences are dropped when the
//!   semantic model already binds them to a symbol
//! - **Scoring**: candidates stream through a pooled scorer from
//!   `ks-similarity`; arity classes are never cross-suggested
//! - **Ranking** ([`rank`]): cost buckets flatten to at most three texts,
//!   ascending by cost then text, never echoing the original
//! - **Materialization** ([`fix`]): texts become titled edit actions, two
//!   or more collapsing into one inlinable group
//!
//! # Usage
//!
//! ```rust,ignore
//! use ks_spellcheck::{CancellationToken, SpellCheckProvider};
//!
//! let provider = SpellCheckProvider::new(policy);
//! let actions = provider
//!     .fixes_at(&document, diagnostic_span, &CancellationToken::new())
//!     .await?;
//! for action in &actions {
//!     println!("{}", action.title());
//! }
//! ```

pub mod error;
pub mod extract;
pub mod fix;
pub mod host;
pub mod rank;

pub use error::SpellCheckError;
pub use extract::NameOccurrence;
pub use fix::{FixAction, FixGroup, Replacement, SpellFix};
pub use host::{
    CompletionItem, CompletionItemKind, CompletionOptions, CompletionProvider, Document,
    SemanticModel, SymbolInfo, SymbolKind,
};
pub use ks_similarity::{Cost, ScorerPool};
pub use ks_span::Span;
pub use tokio_util::sync::CancellationToken;

use extract::locate;
use fix::materialize;
use ks_syntax::{LanguagePolicy, SyntaxTree};
use rank::{MAX_FIXES, SuggestionGroups};
use std::sync::Arc;
use tracing::{debug, trace};

/// The spell-check fix provider
///
/// One provider serves one language and any number of concurrent fix
/// requests. Requests are stateless relative to each other; the scorer
/// pool is the only thing they share.
pub struct SpellCheckProvider {
    policy: Arc<dyn LanguagePolicy>,
    pool: Arc<ScorerPool>,
}

impl SpellCheckProvider {
    /// Creates a provider with its own scorer pool
    #[must_use]
    pub fn new(policy: Arc<dyn LanguagePolicy>) -> Self {
        Self::with_pool(policy, Arc::new(ScorerPool::new()))
    }

    /// Creates a provider over a shared scorer pool
    #[must_use]
    pub fn with_pool(policy: Arc<dyn LanguagePolicy>, pool: Arc<ScorerPool>) -> Self {
        Self { policy, pool }
    }

    /// The pool backing this provider's scorers
    #[must_use]
    pub fn pool(&self) -> &Arc<ScorerPool> {
        &self.pool
    }

    /// Produces fix actions for the unresolved-name diagnostic at `span`
    ///
    /// Returns one action per correctable occurrence under the span, with
    /// several plausible corrections collapsed into a single group. An
    /// empty list means the span matched nothing exactly, the name turned
    /// out to resolve, or no candidate came close enough; none of those
    /// are errors. Cancellation and collaborator faults are.
    pub async fn fixes_at(
        &self,
        document: &dyn Document,
        span: Span,
        cancel: &CancellationToken,
    ) -> Result<Vec<FixAction>, SpellCheckError> {
        ensure_alive(cancel)?;
        let tree = document.syntax_tree().await?;
        ensure_alive(cancel)?;

        let occurrences = locate(&tree, span, self.policy.as_ref());
        if occurrences.is_empty() {
            trace!(%span, "no spell-checkable name at diagnostic span");
            return Ok(Vec::new());
        }

        let mut actions = Vec::new();
        for occurrence in &occurrences {
            if let Some(action) = self
                .check_occurrence(document, &tree, occurrence, cancel)
                .await?
            {
                actions.push(action);
            }
        }
        debug!(%span, actions = actions.len(), "spell-check request finished");
        Ok(actions)
    }

    /// Applies one fix, producing the updated syntax tree
    ///
    /// The fix must target the document version it was produced against;
    /// a replacement span that no longer lands on a token is reported as
    /// [`SpellCheckError::StaleFix`]. The returned tree keeps the
    /// replaced token's trivia untouched.
    pub async fn apply(
        &self,
        document: &dyn Document,
        fix: &SpellFix,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree, SpellCheckError> {
        ensure_alive(cancel)?;
        let tree = document.syntax_tree().await?;
        ensure_alive(cancel)?;

        let Some(token) = tree.find_token_at(fix.replacement.span) else {
            return Err(SpellCheckError::StaleFix {
                span: fix.replacement.span,
            });
        };
        let replacement =
            self.policy
                .build_replacement_token(&tree, token, &fix.replacement.new_text);
        Ok(tree.replace_token(token, replacement))
    }

    async fn check_occurrence(
        &self,
        document: &dyn Document,
        tree: &SyntaxTree,
        occurrence: &NameOccurrence,
        cancel: &CancellationToken,
    ) -> Result<Option<FixAction>, SpellCheckError> {
        if let Some(node) = occurrence.gated_node() {
            let model = document.semantic_model().await?;
            ensure_alive(cancel)?;
            if model.resolve_symbol(tree, node).await?.is_some() {
                debug!(name = occurrence.text(), "name resolves, not a misspelling");
                return Ok(None);
            }
            ensure_alive(cancel)?;
        }

        let completions = document.completion_provider().await?;
        ensure_alive(cancel)?;
        let anchor = tree.token(occurrence.token()).span.start;
        let options = CompletionOptions {
            suppress_snippets: true,
        };
        let items = completions.candidates(anchor, &options).await?;
        ensure_alive(cancel)?;
        if items.is_empty() {
            trace!(name = occurrence.text(), "no completion candidates");
            return Ok(None);
        }

        let groups = self
            .score_candidates(completions.as_ref(), &items, occurrence, cancel)
            .await?;
        let ranked = groups.ranked(occurrence.text(), MAX_FIXES);
        if ranked.is_empty() {
            debug!(
                name = occurrence.text(),
                "no candidate within the similarity threshold"
            );
            return Ok(None);
        }
        let token_span = tree.token(occurrence.token()).span;
        Ok(materialize(occurrence.text(), token_span, ranked))
    }

    async fn score_candidates(
        &self,
        completions: &dyn CompletionProvider,
        items: &[CompletionItem],
        occurrence: &NameOccurrence,
        cancel: &CancellationToken,
    ) -> Result<SuggestionGroups, SpellCheckError> {
        // The checkout travels through every exit below, cancellation
        // included, and rejoins the pool when dropped. Substring tolerance
        // stays on: a candidate containing the misspelling is a good fix.
        let mut scorer = self.pool.checkout(occurrence.text(), true);
        let mut groups = SuggestionGroups::new();
        for item in items {
            ensure_alive(cancel)?;
            if item.kind == CompletionItemKind::Snippet {
                continue;
            }
            if let Some(generic) = occurrence.generic() {
                if item.is_generic() != generic {
                    continue;
                }
            }
            let Some(cost) = scorer.score(&item.filter_text) else {
                continue;
            };
            let insertion = completions.insertion_text(item).await?;
            groups.insert(cost, insertion);
        }
        Ok(groups)
    }
}

fn ensure_alive(cancel: &CancellationToken) -> Result<(), SpellCheckError> {
    if cancel.is_cancelled() {
        Err(SpellCheckError::Cancelled)
    } else {
        Ok(())
    }
}
