//! Candidate answers and the builder that turns facts into them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapter::StructuredSource;
use crate::assemble::{FeatureAssembler, RELEVANCE};
use crate::clue::ClueSet;
use crate::collaborators::RelatednessScorer;
use crate::error::{FanoutError, FanoutResult, ValidationError};
use crate::fact::Fact;
use crate::features::FeatureVector;
use crate::lat::TypeTag;
use crate::provenance::{AnswerId, AnsweringProperty, IdGenerator, ProvenanceStore, SnippetId, SourceId};
use crate::question::QuestionContext;

/// Resource the answer text denotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResource {
    /// Resource IRI.
    pub iri: String,
}

/// One generated, scored answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnswer {
    /// Answer text.
    pub text: String,
    /// Result title: fact subject and property.
    pub title: String,
    /// Source name of the producing adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Provenance id from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<SourceId>,
    /// Answer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<AnswerId>,
    /// Snippets supporting the answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snippet_ids: Vec<SnippetId>,
    /// Result relevance.
    pub relevance: f64,
    /// Last record of its generation cycle.
    pub is_last: bool,
    /// Fully-qualified name of the producing adapter.
    pub origin: String,
    /// Ranking features.
    pub features: FeatureVector,
    /// Type hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<TypeTag>,
    /// Resources the answer denotes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<AnswerResource>,
}

impl CandidateAnswer {
    /// Returns true for the placeholder emitted when a question has no facts.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.source_id.is_none() && self.text.is_empty() && self.features.is_empty()
    }
}

/// Turns facts into candidate answers for one structured source.
pub struct CandidateBuilder {
    source: Arc<dyn StructuredSource>,
    assembler: FeatureAssembler,
    provenance: Arc<dyn ProvenanceStore>,
    answer_ids: Arc<IdGenerator>,
    snippet_ids: Arc<IdGenerator>,
}

impl CandidateBuilder {
    /// Creates a builder for `source` with fresh id spaces.
    #[must_use]
    pub fn new(
        source: Arc<dyn StructuredSource>,
        relatedness: Arc<dyn RelatednessScorer>,
        provenance: Arc<dyn ProvenanceStore>,
    ) -> Self {
        Self::with_ids(
            source,
            relatedness,
            provenance,
            Arc::new(IdGenerator::new()),
            Arc::new(IdGenerator::new()),
        )
    }

    /// Creates a builder drawing answer and snippet ids from shared counters.
    #[must_use]
    pub fn with_ids(
        source: Arc<dyn StructuredSource>,
        relatedness: Arc<dyn RelatednessScorer>,
        provenance: Arc<dyn ProvenanceStore>,
        answer_ids: Arc<IdGenerator>,
        snippet_ids: Arc<IdGenerator>,
    ) -> Self {
        let profile = source.profile();
        let assembler = FeatureAssembler::new(
            profile.clue_prefix.clone(),
            profile.no_clue_feature.clone(),
            relatedness,
        )
        .reserve(profile.lat_feature.clone());
        Self {
            source,
            assembler,
            provenance,
            answer_ids,
            snippet_ids,
        }
    }

    /// The adapter candidates are built for.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn StructuredSource> {
        &self.source
    }

    /// Checks that `fact` can be turned into a candidate without its origin
    /// feature colliding with a generated one.
    ///
    /// # Errors
    /// `ValidationError::ReservedFeature` on a collision.
    pub fn check_fact(&self, fact: &Fact) -> Result<(), ValidationError> {
        self.assembler.check_origin(&fact.origin_feature)
    }

    /// Builds the candidate for `fact`.
    ///
    /// Registers the fact's provenance and stamps the returned source id on
    /// the candidate. Neither `fact` nor `question` is modified.
    ///
    /// # Errors
    /// `FanoutError::Provenance` if the store rejects a record and
    /// `FanoutError::Relatedness` if feature assembly fails.
    pub fn build(
        &self,
        fact: &Fact,
        is_last: bool,
        question: &QuestionContext,
        clues: &ClueSet,
    ) -> FanoutResult<CandidateAnswer> {
        tracing::info!(property = %fact.property, value = %fact.value, "found structured fact");

        let source_id = self
            .provenance
            .store_source(self.source.answer_source(fact))
            .map_err(FanoutError::Provenance)?;
        let snippet_id = SnippetId::from_raw(self.snippet_ids.next_id());
        self.provenance
            .add_snippet(AnsweringProperty {
                snippet_id,
                source_id,
                property: fact.property.clone(),
            })
            .map_err(FanoutError::Provenance)?;

        let mut features = self.assembler.assemble(fact, question, clues)?;
        let type_tag = self
            .source
            .add_type_lat(&fact.value, &fact.property, &mut features);

        let resources = fact
            .value_resource
            .iter()
            .map(|iri| AnswerResource { iri: iri.clone() })
            .collect();

        Ok(CandidateAnswer {
            text: fact.value.clone(),
            title: fact.title(),
            source_name: Some(self.source.profile().source_name.clone()),
            source_id: Some(source_id),
            answer_id: Some(AnswerId::from_raw(self.answer_ids.next_id())),
            snippet_ids: vec![snippet_id],
            relevance: RELEVANCE,
            is_last,
            origin: self.source.origin().to_string(),
            features,
            type_tag: Some(type_tag),
            resources,
        })
    }

    /// Builds the placeholder emitted when a question yields no facts.
    #[must_use]
    pub fn build_dummy(&self, is_last: bool) -> CandidateAnswer {
        tracing::debug!(origin = %self.source.origin(), "no structured facts, emitting dummy candidate");
        CandidateAnswer {
            text: String::new(),
            title: String::new(),
            source_name: None,
            source_id: None,
            answer_id: None,
            snippet_ids: Vec::new(),
            relevance: 0.0,
            is_last,
            origin: self.source.origin().to_string(),
            features: FeatureVector::new(),
            type_tag: None,
            resources: Vec::new(),
        }
    }

    /// Number of clues in `clues` matching `property`, as recorded in
    /// training dumps.
    #[must_use]
    pub fn clue_matches(&self, property: &str, clues: &ClueSet) -> usize {
        clues.count_matches(property)
    }
}

impl std::fmt::Debug for CandidateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateBuilder")
            .field("origin", &self.source.origin())
            .field("assembler", &self.assembler)
            .finish_non_exhaustive()
    }
}
