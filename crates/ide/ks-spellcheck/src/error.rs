//! Error types for spell-check fix requests

use ks_span::Span;

/// Ways a fix request can fail
///
/// Unsuggestive outcomes (no exact span match, the name resolves, nothing
/// passes the similarity cutoff) are not errors; they return an empty fix
/// list instead.
#[derive(Debug, thiserror::Error)]
pub enum SpellCheckError {
    /// The host abandoned the request mid-flight
    #[error("spell-check request was cancelled")]
    Cancelled,

    /// A fix was applied against a document whose tree no longer carries
    /// a token at the recorded span
    #[error("fix target span {span} no longer matches a token")]
    StaleFix {
        /// Where the replaced token was expected to sit
        span: Span,
    },

    /// A collaborator fault (tree, semantic model, or completion engine),
    /// propagated untouched for the host to diagnose
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl SpellCheckError {
    /// Whether this failure came from the host tearing the request down
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
