//! Candidate answer feature vectors.
//!
//! Feature names are the contract with the downstream ranker, so the
//! fixed ones live in [`names`] and never change spelling. Source-specific
//! names (clue markers, origin markers) are built from per-source prefixes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed feature names.
pub mod names {
    /// Number of occurrences of the answer in this generator (always one).
    pub const OCCURENCES: &str = "Occurences";
    /// `ln(1 + relevance)` of the producing result.
    pub const RESULT_LOG_SCORE: &str = "ResultLogScore";
    /// Confidence reported by the structured source.
    pub const PROPERTY_SCORE: &str = "PropertyScore";
    /// Relatedness of the question text and the property name.
    pub const PROPERTY_RELATEDNESS_SCORE: &str = "PropertyRelatednessScore";
    /// Fact subject matches a concept nominated by the question subject.
    pub const ORIGIN_CONCEPT_BY_SUBJECT: &str = "OriginConceptBySubject";
    /// Fact subject matches a concept nominated by the answer type.
    pub const ORIGIN_CONCEPT_BY_LAT: &str = "OriginConceptByLAT";
    /// Fact subject matches a concept nominated by a named entity.
    pub const ORIGIN_CONCEPT_BY_NE: &str = "OriginConceptByNE";

    /// Suffix of the per-source "subject clue matched" feature.
    pub const CLUE_SUBJECT: &str = "ClueSubject";
    /// Suffix of the per-source "LAT-nominated concept clue matched" feature.
    pub const CLUE_LAT: &str = "ClueLAT";
    /// Suffix of the per-source "NE-nominated concept clue matched" feature.
    pub const CLUE_NE: &str = "ClueNE";

    /// Fixed names a fact's origin feature may not take.
    pub const RESERVED: &[&str] = &[
        OCCURENCES,
        RESULT_LOG_SCORE,
        PROPERTY_SCORE,
        PROPERTY_RELATEDNESS_SCORE,
        ORIGIN_CONCEPT_BY_SUBJECT,
        ORIGIN_CONCEPT_BY_LAT,
        ORIGIN_CONCEPT_BY_NE,
    ];

    /// Returns true if `name` is one of the fixed feature names.
    #[must_use]
    pub fn is_reserved(name: &str) -> bool {
        RESERVED.contains(&name)
    }
}

/// Mapping from feature name to weight.
///
/// Keys are unique; setting an existing key overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous weight.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Weight of `name`, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Returns true if `name` is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Copies every entry of `other` into this vector; `other` wins on collisions.
    pub fn merge(&mut self, other: &Self) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), *v);
        }
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterates feature names that start with `prefix`.
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .keys()
            .filter(move |k| k.starts_with(prefix))
            .map(String::as_str)
    }

    /// Number of features set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no feature is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
