//! Question concepts.
//!
//! A concept is an entity or topic nominated by upstream question analysis.
//! The origin flags record which heuristic nominated it; candidates carry
//! them forward as features so the ranker can weigh the evidence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which upstream heuristics nominated a concept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptOrigin {
    /// Nominated because it is the question subject.
    pub by_subject: bool,
    /// Nominated from the lexical answer type.
    pub by_lat: bool,
    /// Nominated from a named entity.
    pub by_ne: bool,
}

impl ConceptOrigin {
    /// Returns true if no heuristic flag is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.by_subject || self.by_lat || self.by_ne)
    }
}

/// A question-derived entity/topic.
///
/// # Examples
///
/// ```
/// use propsearch::Concept;
///
/// let concept = Concept::new("Albert Einstein").with_cooked_label("Einstein").by_lat();
/// assert!(concept.matches_subject("einstein"));
/// assert!(concept.origin.by_lat);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Label as it appeared in the source (e.g. an encyclopedia title).
    pub full_label: String,
    /// Normalized label used for matching facts back to the concept.
    pub cooked_label: String,
    /// Nominating heuristics.
    #[serde(default)]
    pub origin: ConceptOrigin,
}

impl Concept {
    /// Creates a concept whose cooked label equals its full label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            cooked_label: label.clone(),
            full_label: label,
            origin: ConceptOrigin::default(),
        }
    }

    /// Overrides the normalized label.
    #[must_use]
    pub fn with_cooked_label(mut self, cooked: impl Into<String>) -> Self {
        self.cooked_label = cooked.into();
        self
    }

    /// Marks the concept as nominated by the question subject.
    #[must_use]
    pub const fn by_subject(mut self) -> Self {
        self.origin.by_subject = true;
        self
    }

    /// Marks the concept as nominated by the lexical answer type.
    #[must_use]
    pub const fn by_lat(mut self) -> Self {
        self.origin.by_lat = true;
        self
    }

    /// Marks the concept as nominated by a named entity.
    #[must_use]
    pub const fn by_ne(mut self) -> Self {
        self.origin.by_ne = true;
        self
    }

    /// Case-insensitive comparison of the cooked label with a fact subject.
    #[must_use]
    pub fn matches_subject(&self, subject: &str) -> bool {
        self.cooked_label.to_lowercase() == subject.to_lowercase()
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cooked_label)
    }
}
