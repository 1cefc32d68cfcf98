//! Weighted edit-distance scoring for identifier correction
//!
//! The metric is an optimal-string-alignment distance tuned for code
//! identifiers: substitutions between case variants of the same letter are
//! nearly free, adjacent transpositions count as a single edit, and an
//! optional containment rule keeps prefixes and abbreviations of longer
//! names in play. Costs are quarter-unit fixed point so they order exactly
//! as keys of ranked collections, with no floating-point comparison
//! anywhere.
//!
//! Scorers keep their dynamic-programming rows between candidates. A
//! checkout from [`ScorerPool`] scores a whole candidate list without
//! reallocating, and the guard returns the scorer to the pool on drop
//! even when the scoring pass is abandoned partway through.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// One full edit, in quarter units
const UNIT: u32 = 4;
/// Substitution between case variants of the same letter
const CASE_UNIT: u32 = 1;
/// Per-character cost when one name contains the other
const CONTAINMENT_UNIT: u32 = 2;

/// Scorers retained for reuse; drops beyond this discard the scorer
const MAX_POOLED: usize = 8;

/// Edit cost in quarter-unit fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cost(u32);

impl Cost {
    /// No edits at all
    pub const ZERO: Self = Self(0);

    /// Builds a cost from raw quarter units
    #[must_use]
    pub const fn from_quarter_units(units: u32) -> Self {
        Self(units)
    }

    /// Raw quarter units
    #[must_use]
    pub const fn quarter_units(self) -> u32 {
        self.0
    }

    /// Cost in whole edits
    #[must_use]
    pub fn as_f32(self) -> f32 {
        self.0 as f32 * 0.25
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_f32())
    }
}

/// Case-folds a character; the first character of the lowercase mapping
/// is enough for identifier text
fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Longest acceptable distance, stepped by the longer identifier length
fn threshold_for(longer: usize) -> u32 {
    match longer {
        0..=4 => UNIT,
        5..=8 => 2 * UNIT,
        _ => 3 * UNIT,
    }
}

/// Reusable scorer bound to one misspelled identifier
///
/// [`WordScorer::score`] answers whether a candidate is close enough to
/// the bound identifier to suggest, and at what cost. All buffers survive
/// across calls and across rebinds, which is what makes pooling worthwhile.
#[derive(Debug, Default)]
pub struct WordScorer {
    original: Vec<char>,
    original_folded: Vec<char>,
    original_folded_text: String,
    substring_tolerance: bool,
    candidate: Vec<char>,
    candidate_folded: Vec<char>,
    candidate_folded_text: String,
    prev_prev: Vec<u32>,
    prev: Vec<u32>,
    current: Vec<u32>,
}

impl WordScorer {
    /// Creates a scorer bound to `original`
    ///
    /// With `substring_tolerance` on, one name containing the other counts
    /// as similar regardless of how far apart their lengths are.
    #[must_use]
    pub fn new(original: &str, substring_tolerance: bool) -> Self {
        let mut scorer = Self::default();
        scorer.rebind(original, substring_tolerance);
        scorer
    }

    /// Points the scorer at a new identifier, keeping its buffers
    pub fn rebind(&mut self, original: &str, substring_tolerance: bool) {
        self.substring_tolerance = substring_tolerance;
        self.original.clear();
        self.original.extend(original.chars());
        self.original_folded.clear();
        self.original_folded
            .extend(self.original.iter().map(|ch| fold(*ch)));
        self.original_folded_text.clear();
        self.original_folded_text
            .extend(self.original_folded.iter());
    }

    /// Scores `candidate` against the bound identifier
    ///
    /// Returns `None` when the candidate is too far away to ever be worth
    /// suggesting. A cost of zero means the texts are identical; whether
    /// identical is useful is the caller's call.
    pub fn score(&mut self, candidate: &str) -> Option<Cost> {
        self.candidate.clear();
        self.candidate.extend(candidate.chars());
        self.candidate_folded.clear();
        for index in 0..self.candidate.len() {
            self.candidate_folded.push(fold(self.candidate[index]));
        }
        self.candidate_folded_text.clear();
        self.candidate_folded_text
            .extend(self.candidate_folded.iter());

        let orig_len = self.original.len();
        let cand_len = self.candidate.len();

        // One name containing the other is similarity in its own right:
        // each uncovered character costs half an edit, with no cutoff.
        // Equal lengths fall through so case variants go through the
        // distance proper.
        if self.substring_tolerance && orig_len != cand_len {
            let (contained_len, contains) = if orig_len < cand_len {
                let contains = self
                    .candidate_folded_text
                    .contains(self.original_folded_text.as_str());
                (orig_len, contains)
            } else {
                let contains = self
                    .original_folded_text
                    .contains(self.candidate_folded_text.as_str());
                (cand_len, contains)
            };
            if contained_len >= 3 && contains {
                let gap = orig_len.abs_diff(cand_len) as u32;
                return Some(Cost(gap * CONTAINMENT_UNIT));
            }
        }

        let threshold = threshold_for(orig_len.max(cand_len));
        if orig_len.abs_diff(cand_len) as u32 * UNIT > threshold {
            return None;
        }

        self.prepare_rows(cand_len);
        for i in 1..=orig_len {
            self.current[0] = i as u32 * UNIT;
            for j in 1..=cand_len {
                let substitution = if self.original[i - 1] == self.candidate[j - 1] {
                    0
                } else if self.original_folded[i - 1] == self.candidate_folded[j - 1] {
                    CASE_UNIT
                } else {
                    UNIT
                };
                let mut best = (self.prev[j] + UNIT)
                    .min(self.current[j - 1] + UNIT)
                    .min(self.prev[j - 1] + substitution);
                if i > 1
                    && j > 1
                    && self.original_folded[i - 1] == self.candidate_folded[j - 2]
                    && self.original_folded[i - 2] == self.candidate_folded[j - 1]
                {
                    best = best.min(self.prev_prev[j - 2] + UNIT);
                }
                self.current[j] = best;
            }

            // Later rows only ever build on the last two, so once both
            // sit above the threshold the candidate cannot recover.
            let reachable = self
                .current
                .iter()
                .chain(self.prev.iter())
                .min()
                .copied()
                .unwrap_or(0);
            if reachable > threshold {
                return None;
            }

            std::mem::swap(&mut self.prev_prev, &mut self.prev);
            std::mem::swap(&mut self.prev, &mut self.current);
        }

        let total = self.prev[cand_len];
        (total <= threshold).then_some(Cost(total))
    }

    fn prepare_rows(&mut self, cand_len: usize) {
        self.prev.clear();
        self.prev.extend((0..=cand_len).map(|j| j as u32 * UNIT));
        self.prev_prev.clear();
        self.prev_prev.resize(cand_len + 1, 0);
        self.current.clear();
        self.current.resize(cand_len + 1, 0);
    }
}

/// Shared pool of [`WordScorer`] instances
///
/// Scoring one diagnostic means checking every completion candidate, so
/// concurrent fix requests would otherwise allocate fresh scratch rows
/// each time. The pool caps retained scorers at a small fixed number.
#[derive(Debug, Default)]
pub struct ScorerPool {
    scorers: Mutex<Vec<WordScorer>>,
}

impl ScorerPool {
    /// Creates an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a scorer bound to `original`, reusing a pooled one if any
    pub fn checkout(&self, original: &str, substring_tolerance: bool) -> PooledScorer<'_> {
        let mut scorer = self.lock().pop().unwrap_or_default();
        scorer.rebind(original, substring_tolerance);
        PooledScorer {
            pool: self,
            scorer: Some(scorer),
        }
    }

    /// Scorers currently resting in the pool
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WordScorer>> {
        match self.scorers.lock() {
            Ok(guard) => guard,
            // scorers are rebound on checkout, poisoned state is reusable
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Checkout guard that hands its scorer back to the pool on drop
pub struct PooledScorer<'pool> {
    pool: &'pool ScorerPool,
    scorer: Option<WordScorer>,
}

impl PooledScorer<'_> {
    /// Scores `candidate` against the identifier this checkout bound
    pub fn score(&mut self, candidate: &str) -> Option<Cost> {
        self.scorer.as_mut()?.score(candidate)
    }
}

impl Drop for PooledScorer<'_> {
    fn drop(&mut self) {
        if let Some(scorer) = self.scorer.take() {
            let mut scorers = self.pool.lock();
            if scorers.len() < MAX_POOLED {
                scorers.push(scorer);
            }
        }
    }
}
