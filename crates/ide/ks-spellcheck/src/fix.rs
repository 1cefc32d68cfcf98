//! Fix actions: ranked candidates turned into reversible edits

use ks_span::Span;
use serde::{Deserialize, Serialize};

/// A single text substitution against one document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Span of the token being replaced
    pub span: Span,
    /// Text that takes its place
    pub new_text: String,
}

/// One concrete correction for a misspelled identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellFix {
    /// User-facing description, `change 'X' to 'Y'`
    pub title: String,
    /// The edit this fix performs
    pub replacement: Replacement,
}

impl SpellFix {
    pub(crate) fn new(original: &str, span: Span, candidate: String) -> Self {
        Self {
            title: format!("change '{original}' to '{candidate}'"),
            replacement: Replacement {
                span,
                new_text: candidate,
            },
        }
    }
}

/// A collapsible set of alternative corrections for one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixGroup {
    /// User-facing description, `spell-check: X`
    pub title: String,
    /// Whether the host may flatten the group back into its members
    pub inlinable: bool,
    /// Alternatives, best first
    pub fixes: Vec<SpellFix>,
}

/// What one occurrence's fix request produces
///
/// Two or more surviving candidates collapse into a group so the host's
/// fix list shows a single entry instead of a run of near-duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixAction {
    /// Exactly one plausible correction
    Single(SpellFix),
    /// Several corrections presented as one collapsible entry
    Group(FixGroup),
}

impl FixAction {
    /// Title shown in the host's fix list
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Single(fix) => &fix.title,
            Self::Group(group) => &group.title,
        }
    }

    /// Concrete fixes in rank order
    #[must_use]
    pub fn fixes(&self) -> &[SpellFix] {
        match self {
            Self::Single(fix) => std::slice::from_ref(fix),
            Self::Group(group) => &group.fixes,
        }
    }
}

/// Builds the action for one occurrence out of its ranked candidates
pub(crate) fn materialize(
    original: &str,
    token_span: Span,
    ranked: Vec<String>,
) -> Option<FixAction> {
    let mut fixes: Vec<SpellFix> = ranked
        .into_iter()
        .map(|candidate| SpellFix::new(original, token_span, candidate))
        .collect();
    match fixes.len() {
        0 => None,
        1 => fixes.pop().map(FixAction::Single),
        _ => Some(FixAction::Group(FixGroup {
            title: format!("spell-check: {original}"),
            inlinable: true,
            fixes,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_nothing() {
        assert_eq!(materialize("Wriet", Span::new(0, 5), Vec::new()), None);
    }

    #[test]
    fn test_materialize_single_stays_ungrouped() {
        let action = materialize("Cosnole", Span::new(4, 11), vec!["Console".to_string()])
            .expect("one fix");
        assert_eq!(action.title(), "change 'Cosnole' to 'Console'");
        let fixes = action.fixes();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].replacement.span, Span::new(4, 11));
        assert_eq!(fixes[0].replacement.new_text, "Console");
        assert!(matches!(action, FixAction::Single(_)));
    }

    #[test]
    fn test_materialize_many_collapse_into_group() {
        let ranked = vec!["Write".to_string(), "Writer".to_string()];
        let action = materialize("Wriet", Span::new(0, 5), ranked).expect("grouped fix");
        assert_eq!(action.title(), "spell-check: Wriet");

        let FixAction::Group(group) = &action else {
            panic!("expected a group");
        };
        assert!(group.inlinable);
        assert_eq!(group.fixes.len(), 2);
        assert_eq!(group.fixes[0].title, "change 'Wriet' to 'Write'");
        assert_eq!(group.fixes[1].title, "change 'Wriet' to 'Writer'");
    }
}
