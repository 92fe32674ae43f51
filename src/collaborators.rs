//! Contracts of the external services a generation cycle calls.
//!
//! These traits define what the core needs from the knowledge source and
//! the relatedness scorer. By using traits, we enable:
//! - In-memory sources for testing and embedded use
//! - Remote SPARQL/graph backends in production
//!
//! Implementations are shared across concurrently running cycles and must
//! be safe to call from many threads.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::concept::Concept;
use crate::error::CollaboratorError;
use crate::fact::Fact;

/// Resolves a concept to the facts a structured source holds about it.
pub trait KnowledgeSource: Send + Sync {
    /// Facts about `concept`, in source order.
    fn fetch_facts(&self, concept: &Concept) -> Result<Vec<Fact>, CollaboratorError>;
}

/// Scores how related a question text is to a property name.
///
/// Must be deterministic for a given text pair.
pub trait RelatednessScorer: Send + Sync {
    /// Relatedness of `question` and `property`.
    fn relatedness(&self, question: &str, property: &str) -> Result<f64, CollaboratorError>;
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// In-memory knowledge source keyed by normalized concept label.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeSource {
    facts: RwLock<HashMap<String, Vec<Fact>>>,
}

impl InMemoryKnowledgeSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fact under `label`.
    pub fn insert(&self, label: &str, fact: Fact) -> Result<(), CollaboratorError> {
        let mut facts = self
            .facts
            .write()
            .map_err(|_| CollaboratorError::KnowledgeSource("poisoned lock: facts".to_string()))?;
        facts.entry(normalize_key(label)).or_default().push(fact);
        Ok(())
    }
}

impl KnowledgeSource for InMemoryKnowledgeSource {
    fn fetch_facts(&self, concept: &Concept) -> Result<Vec<Fact>, CollaboratorError> {
        let facts = self
            .facts
            .read()
            .map_err(|_| CollaboratorError::KnowledgeSource("poisoned lock: facts".to_string()))?;
        Ok(facts
            .get(&normalize_key(&concept.cooked_label))
            .cloned()
            .unwrap_or_default())
    }
}
