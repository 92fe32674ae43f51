//! Answer provenance records and the store that numbers them.
//!
//! Every non-dummy candidate is traceable to the structured source that
//! produced it: an [`AnswerSource`] describes the source, an
//! [`AnsweringProperty`] snippet names the property that answered. The
//! store hands back the id stamped on the candidate.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::fact::Fact;

/// Identifier of a stored answer source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(u64);

impl SourceId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(u64);

impl SnippetId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifier of a candidate answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(u64);

impl AnswerId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Thread-safe monotonic id counter starting at 1.
///
/// Shared between generator instances by `Arc`, one per id space.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Creates a counter whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Which structured source family produced a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredKind {
    /// Curated DBpedia ontology properties.
    DbpOntology,
    /// Raw DBpedia infobox properties.
    DbpProperty,
    /// Freebase topic properties.
    Freebase,
}

impl fmt::Display for StructuredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DbpOntology => write!(f, "dbpedia-ontology"),
            Self::DbpProperty => write!(f, "dbpedia-property"),
            Self::Freebase => write!(f, "freebase"),
        }
    }
}

/// Provenance record of a structured answer source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSource {
    /// Source family.
    pub kind: StructuredKind,
    /// Configured source name.
    pub source_name: String,
    /// Subject the fact is about.
    pub subject: String,
    /// Property the fact came from.
    pub property: String,
    /// When the record was created.
    pub retrieved_at: DateTime<Utc>,
}

impl AnswerSource {
    /// Creates a record for `fact` stamped with the current time.
    #[must_use]
    pub fn structured(kind: StructuredKind, source_name: impl Into<String>, fact: &Fact) -> Self {
        Self {
            kind,
            source_name: source_name.into(),
            subject: fact.subject.clone(),
            property: fact.property.clone(),
            retrieved_at: Utc::now(),
        }
    }
}

/// Snippet naming the property that answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweringProperty {
    /// Snippet id.
    pub snippet_id: SnippetId,
    /// Source the snippet belongs to.
    pub source_id: SourceId,
    /// The answering property name.
    pub property: String,
}

/// Central store of answer provenance.
///
/// Shared by every cycle of every question; implementations serialize
/// their own writes.
pub trait ProvenanceStore: Send + Sync {
    /// Stores a source and returns its id.
    fn store_source(&self, source: AnswerSource) -> Result<SourceId, CollaboratorError>;

    /// Records a snippet.
    fn add_snippet(&self, snippet: AnsweringProperty) -> Result<(), CollaboratorError>;
}

fn lock_err(context: &'static str) -> CollaboratorError {
    CollaboratorError::Provenance(format!("poisoned lock: {context}"))
}

/// In-memory provenance store. Source ids are assigned from 1 in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProvenanceStore {
    sources: RwLock<Vec<AnswerSource>>,
    snippets: RwLock<Vec<AnsweringProperty>>,
}

impl InMemoryProvenanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a stored source.
    pub fn source(&self, id: SourceId) -> Result<Option<AnswerSource>, CollaboratorError> {
        let sources = self.sources.read().map_err(|_| lock_err("sources"))?;
        let Some(idx) = usize::try_from(id.get()).ok().and_then(|i| i.checked_sub(1)) else {
            return Ok(None);
        };
        Ok(sources.get(idx).cloned())
    }

    /// Snippets recorded for a source.
    pub fn snippets_for(&self, id: SourceId) -> Result<Vec<AnsweringProperty>, CollaboratorError> {
        let snippets = self.snippets.read().map_err(|_| lock_err("snippets"))?;
        Ok(snippets.iter().filter(|s| s.source_id == id).cloned().collect())
    }

    /// Number of stored sources.
    pub fn source_count(&self) -> Result<usize, CollaboratorError> {
        Ok(self.sources.read().map_err(|_| lock_err("sources"))?.len())
    }
}

impl ProvenanceStore for InMemoryProvenanceStore {
    fn store_source(&self, source: AnswerSource) -> Result<SourceId, CollaboratorError> {
        let mut sources = self.sources.write().map_err(|_| lock_err("sources"))?;
        sources.push(source);
        Ok(SourceId(sources.len() as u64))
    }

    fn add_snippet(&self, snippet: AnsweringProperty) -> Result<(), CollaboratorError> {
        let mut snippets = self.snippets.write().map_err(|_| lock_err("snippets"))?;
        snippets.push(snippet);
        Ok(())
    }
}
