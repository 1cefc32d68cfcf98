//! Cost-ordered candidate grouping and ranking

use ks_similarity::Cost;
use std::collections::BTreeMap;

/// Fix choices offered per occurrence are capped here
pub(crate) const MAX_FIXES: usize = 3;

/// Candidate texts grouped by similarity cost
///
/// Buckets hold texts in raw arrival order and may contain duplicates;
/// ordering and the equal-to-original filter are settled during
/// [`SuggestionGroups::ranked`].
#[derive(Debug, Default)]
pub struct SuggestionGroups {
    buckets: BTreeMap<Cost, Vec<String>>,
}

impl SuggestionGroups {
    /// Creates an empty grouping
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `text` under `cost`
    pub fn insert(&mut self, cost: Cost, text: String) {
        self.buckets.entry(cost).or_default().push(text);
    }

    /// Whether any candidate was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Flattens to at most `limit` texts, ascending by cost and within a
    /// cost ascending by text
    ///
    /// Entries equal to `original` are dropped before the cap applies,
    /// so a candidate pool containing the misspelling itself never
    /// shrinks the offered list. Duplicate texts stay in.
    #[must_use]
    pub fn ranked(&self, original: &str, limit: usize) -> Vec<String> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        for texts in self.buckets.values() {
            let mut bucket = texts.clone();
            bucket.sort();
            for text in bucket {
                if text == original {
                    continue;
                }
                out.push(text);
                if out.len() == limit {
                    return out;
                }
            }
        }
        out
    }
}
