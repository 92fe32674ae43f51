//! The question record a generation cycle expands.

use serde::{Deserialize, Serialize};

use crate::clue::Clue;
use crate::concept::Concept;
use crate::error::CollaboratorError;

/// Everything the generator reads from the question being answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionContext {
    /// Upstream question identifier.
    pub question_id: String,
    /// Question text.
    pub text: String,
    /// Regex of the known correct answer (training data only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_pattern: Option<String>,
    /// Concepts in the order upstream produced them.
    #[serde(default)]
    pub concepts: Vec<Concept>,
    /// Clues in the order upstream produced them.
    #[serde(default)]
    pub clues: Vec<Clue>,
}

impl QuestionContext {
    /// Creates a question with no concepts or clues.
    #[must_use]
    pub fn new(question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Adds a concept.
    #[must_use]
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Adds a clue.
    #[must_use]
    pub fn with_clue(mut self, clue: Clue) -> Self {
        self.clues.push(clue);
        self
    }

    /// Sets the known answer pattern.
    #[must_use]
    pub fn with_answer_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.answer_pattern = Some(pattern.into());
        self
    }
}

/// Produces an isolated copy of a question for each emitted candidate.
///
/// Implementations must return a copy that shares no mutable state with
/// `src`; concurrent consumers of sibling candidates rely on that.
pub trait ContextCopier: Send + Sync {
    /// Deep-copies `src`.
    fn copy_context(&self, src: &QuestionContext) -> Result<QuestionContext, CollaboratorError>;
}

/// Copier backed by `Clone`; the context owns all its data.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloneCopier;

impl ContextCopier for CloneCopier {
    fn copy_context(&self, src: &QuestionContext) -> Result<QuestionContext, CollaboratorError> {
        Ok(src.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::ClueKind;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_copier_object_safe(_: &dyn ContextCopier) {}

    #[test]
    fn test_builder_helpers() {
        let q = QuestionContext::new("q1", "Where was Einstein born?")
            .with_concept(Concept::new("Einstein"))
            .with_clue(Clue::new(ClueKind::Sv, "born"))
            .with_answer_pattern("Ulm");
        assert_eq!(q.concepts.len(), 1);
        assert_eq!(q.clues.len(), 1);
        assert_eq!(q.answer_pattern.as_deref(), Some("Ulm"));
    }

    #[test]
    fn test_clone_copier_is_independent() {
        let src = QuestionContext::new("q1", "text").with_concept(Concept::new("a"));
        let mut copy = CloneCopier.copy_context(&src).unwrap();
        assert_eq!(copy, src);
        copy.concepts.push(Concept::new("b"));
        assert_eq!(src.concepts.len(), 1);
    }
}
