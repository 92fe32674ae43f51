//! Clue matching against property names.
//!
//! A property whose name mentions a question clue ("birth place" for
//! "Where was X born?") is much more likely to hold the answer. The
//! matcher reports which clue kinds matched as source-prefixed features.

use crate::clue::{Clue, ClueSet};
use crate::features::{names, FeatureVector};

/// Outcome of matching one name against a clue set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClueMatch {
    /// At least one clue matched.
    pub matched: bool,
    /// Features to add to the candidate; empty if nothing matched.
    pub updates: FeatureVector,
}

/// Emits `<prefix>`-namespaced clue features.
#[derive(Debug, Clone)]
pub struct ClueMatcher {
    prefix: String,
}

impl ClueMatcher {
    /// Creates a matcher namespacing its features with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The feature prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Matches `name` against every clue and unions the features of all
    /// clues that match.
    #[must_use]
    pub fn match_name(&self, name: &str, clues: &ClueSet) -> ClueMatch {
        let mut out = ClueMatch::default();
        for clue in clues.matching(name) {
            out.matched = true;
            self.clue_features(clue, &mut out.updates);
        }
        out
    }

    fn feature(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.prefix)
    }

    fn clue_features(&self, clue: &Clue, fv: &mut FeatureVector) {
        fv.set(self.feature(clue.kind.short_name()), 1.0);
        if clue.kind.is_subject() {
            fv.set(self.feature(names::CLUE_SUBJECT), 1.0);
        } else if clue.kind.is_concept() {
            for concept in &clue.concepts {
                if concept.origin.by_subject {
                    fv.set(self.feature(names::CLUE_SUBJECT), 1.0);
                }
                if concept.origin.by_lat {
                    fv.set(self.feature(names::CLUE_LAT), 1.0);
                }
                if concept.origin.by_ne {
                    fv.set(self.feature(names::CLUE_NE), 1.0);
                }
            }
        }
    }
}
