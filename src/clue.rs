//! Question clues and their match patterns.
//!
//! A clue is a question token or phrase that candidate text is matched
//! against. Each clue compiles to a regex that matches a whole string
//! containing the clue label on word boundaries.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::concept::Concept;
use crate::error::ValidationError;

/// Kind of a clue, i.e. which question analysis produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueKind {
    /// Single content token.
    Token,
    /// Selecting verb.
    Sv,
    /// Named entity.
    Ne,
    /// Token n-gram.
    Ngram,
    /// Noun phrase.
    Phrase,
    /// Lexical answer type.
    Lat,
    /// Question focus.
    Focus,
    /// Question subject.
    Subject,
    /// Question subject recognized as a named entity.
    SubjectNe,
    /// Question subject as a single token.
    SubjectToken,
    /// Question subject as a phrase.
    SubjectPhrase,
    /// Concept resolved from the question.
    Concept,
}

impl ClueKind {
    /// Stable name used in feature keys.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Token => "ClueToken",
            Self::Sv => "ClueSV",
            Self::Ne => "ClueNE",
            Self::Ngram => "ClueNgram",
            Self::Phrase => "CluePhrase",
            Self::Lat => "ClueLAT",
            Self::Focus => "ClueFocus",
            Self::Subject => "ClueSubject",
            Self::SubjectNe => "ClueSubjectNE",
            Self::SubjectToken => "ClueSubjectToken",
            Self::SubjectPhrase => "ClueSubjectPhrase",
            Self::Concept => "ClueConcept",
        }
    }

    /// Returns true for any of the subject clue kinds.
    #[must_use]
    pub const fn is_subject(self) -> bool {
        matches!(
            self,
            Self::Subject | Self::SubjectNe | Self::SubjectToken | Self::SubjectPhrase
        )
    }

    /// Returns true for concept clues.
    #[must_use]
    pub const fn is_concept(self) -> bool {
        matches!(self, Self::Concept)
    }
}

impl fmt::Display for ClueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A question-derived matchable token or phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    /// Clue kind.
    pub kind: ClueKind,
    /// Surface text the match pattern is built from.
    pub label: String,
    /// Match case exactly instead of ignoring it.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Concepts referenced by a concept clue.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
}

impl Clue {
    /// Creates a case-insensitive clue of the given kind.
    #[must_use]
    pub fn new(kind: ClueKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            case_sensitive: false,
            concepts: Vec::new(),
        }
    }

    /// Creates a concept clue referencing the given concepts.
    #[must_use]
    pub fn concept(label: impl Into<String>, concepts: Vec<Concept>) -> Self {
        Self {
            concepts,
            ..Self::new(ClueKind::Concept, label)
        }
    }

    /// Requires exact case when matching.
    #[must_use]
    pub const fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// The regex source this clue matches with.
    ///
    /// The pattern matches a whole string that contains the label
    /// delimited by word boundaries.
    #[must_use]
    pub fn pattern(&self) -> String {
        format!(r"^.*\b{}\b.*$", regex::escape(&self.label))
    }

    /// Compiles the match pattern honoring the clue's case rule.
    pub fn compile(&self) -> Result<Regex, ValidationError> {
        let pattern = self.pattern();
        RegexBuilder::new(&pattern)
            .case_insensitive(!self.case_sensitive)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| ValidationError::InvalidPattern {
                pattern,
                reason: e.to_string(),
            })
    }
}

/// Clues of one question with their patterns compiled once per cycle.
#[derive(Debug, Clone, Default)]
pub struct ClueSet {
    entries: Vec<(Clue, Regex)>,
}

impl ClueSet {
    /// Compiles every clue. Fails on the first pattern that does not compile.
    pub fn compile(clues: &[Clue]) -> Result<Self, ValidationError> {
        let entries = clues
            .iter()
            .map(|clue| clue.compile().map(|re| (clue.clone(), re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Clues whose pattern matches `name` as a full string.
    pub fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Clue> + 'a {
        self.entries
            .iter()
            .filter(move |(_, re)| re.is_match(name))
            .map(|(clue, _)| clue)
    }

    /// Number of clues matching `name`.
    #[must_use]
    pub fn count_matches(&self, name: &str) -> usize {
        self.matching(name).count()
    }

    /// Number of clues in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set holds no clues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names_are_stable() {
        assert_eq!(ClueKind::Subject.short_name(), "ClueSubject");
        assert_eq!(ClueKind::Lat.short_name(), "ClueLAT");
        assert_eq!(ClueKind::SubjectNe.short_name(), "ClueSubjectNE");
        assert_eq!(format!("{}", ClueKind::Concept), "ClueConcept");
    }

    #[test]
    fn test_subject_kinds() {
        assert!(ClueKind::Subject.is_subject());
        assert!(ClueKind::SubjectPhrase.is_subject());
        assert!(!ClueKind::Concept.is_subject());
        assert!(ClueKind::Concept.is_concept());
    }

    #[test]
    fn test_clue_matches_on_word_boundary() {
        let re = Clue::new(ClueKind::Token, "birth").compile().unwrap();
        assert!(re.is_match("birth place"));
        assert!(re.is_match("place of birth"));
        assert!(!re.is_match("birthplace"));
    }

    #[test]
    fn test_clue_case_rules() {
        let loose = Clue::new(ClueKind::Token, "Birth").compile().unwrap();
        assert!(loose.is_match("birth date"));

        let strict = Clue::new(ClueKind::Token, "Birth").case_sensitive().compile().unwrap();
        assert!(!strict.is_match("birth date"));
        assert!(strict.is_match("Birth date"));
    }

    #[test]
    fn test_label_metacharacters_are_literal() {
        let re = Clue::new(ClueKind::Token, "a.b").compile().unwrap();
        assert!(re.is_match("x a.b y"));
        assert!(!re.is_match("x axb y"));
    }

    #[test]
    fn test_clue_set_counts() {
        let set = ClueSet::compile(&[
            Clue::new(ClueKind::Token, "birth"),
            Clue::new(ClueKind::Subject, "birth place"),
            Clue::new(ClueKind::Lat, "city"),
        ])
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.count_matches("birth place"), 2);
        assert_eq!(set.count_matches("spouse"), 0);
        assert!(ClueSet::default().is_empty());
    }

    #[test]
    fn test_concept_clue_serialization() {
        let clue = Clue::concept("Einstein", vec![Concept::new("Einstein").by_ne()]);
        let json = serde_json::to_string(&clue).unwrap();
        let back: Clue = serde_json::from_str(&json).unwrap();
        assert_eq!(clue, back);
    }
}
