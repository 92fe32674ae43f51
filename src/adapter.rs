//! Structured-source adapters.
//!
//! The generator only depends on [`StructuredSource`]; each adapter binds
//! a knowledge source to the names its candidates are tagged with (source
//! name, clue feature prefix, no-clue feature, LAT feature).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collaborators::KnowledgeSource;
use crate::concept::Concept;
use crate::error::CollaboratorError;
use crate::fact::Fact;
use crate::features::FeatureVector;
use crate::lat::{self, TypeTag};
use crate::provenance::{AnswerSource, StructuredKind};
use crate::question::QuestionContext;

/// Names a structured source stamps on its candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Source family.
    pub kind: StructuredKind,
    /// Source name recorded on candidates and provenance.
    pub source_name: String,
    /// Prefix of clue-match features.
    pub clue_prefix: String,
    /// Feature set to -1.0 when no clue matches.
    pub no_clue_feature: String,
    /// Feature set to 1.0 when a type tag is attached.
    pub lat_feature: String,
}

impl SourceProfile {
    /// Profile of curated DBpedia ontology properties.
    #[must_use]
    pub fn dbpedia_ontology() -> Self {
        Self {
            kind: StructuredKind::DbpOntology,
            source_name: "DBpedia".to_string(),
            clue_prefix: "DBpOnt".to_string(),
            no_clue_feature: "DBpOntNoClue".to_string(),
            lat_feature: "LATDBpOntology".to_string(),
        }
    }

    /// Profile of raw DBpedia infobox properties.
    #[must_use]
    pub fn dbpedia_property() -> Self {
        Self {
            kind: StructuredKind::DbpProperty,
            source_name: "DBpedia".to_string(),
            clue_prefix: "DBpProp".to_string(),
            no_clue_feature: "DBpPropNoClue".to_string(),
            lat_feature: "LATDBpProperty".to_string(),
        }
    }

    /// Profile of Freebase topic properties.
    #[must_use]
    pub fn freebase() -> Self {
        Self {
            kind: StructuredKind::Freebase,
            source_name: "Freebase".to_string(),
            clue_prefix: "Fb".to_string(),
            no_clue_feature: "FbNoClue".to_string(),
            lat_feature: "LATFreebase".to_string(),
        }
    }
}

/// Capability interface of a structured source.
///
/// # Thread Safety
/// Adapters are shared by every generator of their kind and must be
/// callable from many cycles at once.
pub trait StructuredSource: Send + Sync {
    /// Names stamped on candidates of this source.
    fn profile(&self) -> &SourceProfile;

    /// Facts about one concept of `question`.
    fn concept_facts(
        &self,
        question: &QuestionContext,
        concept: &Concept,
    ) -> Result<Vec<Fact>, CollaboratorError>;

    /// Provenance record for a fact.
    fn answer_source(&self, fact: &Fact) -> AnswerSource;

    /// Attaches a type tag for `text` derived from `property` and marks
    /// the source's LAT feature.
    fn add_type_lat(&self, text: &str, property: &str, fv: &mut FeatureVector) -> TypeTag;

    /// Fully-qualified name of the adapter, recorded as candidate origin.
    fn origin(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Clone)]
struct Binding {
    profile: SourceProfile,
    knowledge: Arc<dyn KnowledgeSource>,
}

impl Binding {
    fn facts(&self, concept: &Concept) -> Result<Vec<Fact>, CollaboratorError> {
        self.knowledge.fetch_facts(concept)
    }

    fn answer_source(&self, fact: &Fact) -> AnswerSource {
        AnswerSource::structured(self.profile.kind, self.profile.source_name.clone(), fact)
    }

    fn type_lat(&self, text: &str, property: &str, fv: &mut FeatureVector) -> TypeTag {
        fv.set(self.profile.lat_feature.clone(), 1.0);
        lat::tag(text, property, self.profile.kind)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// DBpedia ontology adapter.
#[derive(Debug, Clone)]
pub struct DbpOntologySource {
    inner: Binding,
}

impl DbpOntologySource {
    /// Binds `knowledge` with the default ontology profile.
    #[must_use]
    pub fn new(knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self::with_profile(knowledge, SourceProfile::dbpedia_ontology())
    }

    /// Binds `knowledge` with a custom profile.
    #[must_use]
    pub fn with_profile(knowledge: Arc<dyn KnowledgeSource>, profile: SourceProfile) -> Self {
        Self {
            inner: Binding { profile, knowledge },
        }
    }
}

impl StructuredSource for DbpOntologySource {
    fn profile(&self) -> &SourceProfile {
        &self.inner.profile
    }

    fn concept_facts(
        &self,
        _question: &QuestionContext,
        concept: &Concept,
    ) -> Result<Vec<Fact>, CollaboratorError> {
        self.inner.facts(concept)
    }

    fn answer_source(&self, fact: &Fact) -> AnswerSource {
        self.inner.answer_source(fact)
    }

    fn add_type_lat(&self, text: &str, property: &str, fv: &mut FeatureVector) -> TypeTag {
        self.inner.type_lat(text, property, fv)
    }
}

/// DBpedia raw infobox property adapter.
#[derive(Debug, Clone)]
pub struct DbpPropertySource {
    inner: Binding,
}

impl DbpPropertySource {
    /// Binds `knowledge` with the default raw-property profile.
    #[must_use]
    pub fn new(knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self::with_profile(knowledge, SourceProfile::dbpedia_property())
    }

    /// Binds `knowledge` with a custom profile.
    #[must_use]
    pub fn with_profile(knowledge: Arc<dyn KnowledgeSource>, profile: SourceProfile) -> Self {
        Self {
            inner: Binding { profile, knowledge },
        }
    }
}

impl StructuredSource for DbpPropertySource {
    fn profile(&self) -> &SourceProfile {
        &self.inner.profile
    }

    fn concept_facts(
        &self,
        _question: &QuestionContext,
        concept: &Concept,
    ) -> Result<Vec<Fact>, CollaboratorError> {
        self.inner.facts(concept)
    }

    fn answer_source(&self, fact: &Fact) -> AnswerSource {
        self.inner.answer_source(fact)
    }

    fn add_type_lat(&self, text: &str, property: &str, fv: &mut FeatureVector) -> TypeTag {
        self.inner.type_lat(text, property, fv)
    }
}

/// Freebase adapter.
#[derive(Debug, Clone)]
pub struct FreebaseSource {
    inner: Binding,
}

impl FreebaseSource {
    /// Binds `knowledge` with the default Freebase profile.
    #[must_use]
    pub fn new(knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self::with_profile(knowledge, SourceProfile::freebase())
    }

    /// Binds `knowledge` with a custom profile.
    #[must_use]
    pub fn with_profile(knowledge: Arc<dyn KnowledgeSource>, profile: SourceProfile) -> Self {
        Self {
            inner: Binding { profile, knowledge },
        }
    }
}

impl StructuredSource for FreebaseSource {
    fn profile(&self) -> &SourceProfile {
        &self.inner.profile
    }

    fn concept_facts(
        &self,
        _question: &QuestionContext,
        concept: &Concept,
    ) -> Result<Vec<Fact>, CollaboratorError> {
        self.inner.facts(concept)
    }

    fn answer_source(&self, fact: &Fact) -> AnswerSource {
        self.inner.answer_source(fact)
    }

    fn add_type_lat(&self, text: &str, property: &str, fv: &mut FeatureVector) -> TypeTag {
        self.inner.type_lat(text, property, fv)
    }
}
