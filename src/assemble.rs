//! Feature assembly for structured candidates.

use std::sync::Arc;

use crate::clue::ClueSet;
use crate::collaborators::RelatednessScorer;
use crate::concept::Concept;
use crate::error::{FanoutError, FanoutResult, ValidationError};
use crate::fact::Fact;
use crate::features::{names, FeatureVector};
use crate::matcher::ClueMatcher;
use crate::question::QuestionContext;

/// Relevance of every structured result. Facts are exact lookups, not
/// ranked search hits.
pub const RELEVANCE: f64 = 1.0;

/// Builds the feature vector of one candidate.
pub struct FeatureAssembler {
    matcher: ClueMatcher,
    no_clue_feature: String,
    reserved: Vec<String>,
    relatedness: Arc<dyn RelatednessScorer>,
}

impl FeatureAssembler {
    /// Creates an assembler emitting clue features under `clue_prefix`.
    #[must_use]
    pub fn new(
        clue_prefix: impl Into<String>,
        no_clue_feature: impl Into<String>,
        relatedness: Arc<dyn RelatednessScorer>,
    ) -> Self {
        Self {
            matcher: ClueMatcher::new(clue_prefix),
            no_clue_feature: no_clue_feature.into(),
            reserved: Vec::new(),
            relatedness,
        }
    }

    /// Reserves a further feature name set after assembly, so no fact may
    /// use it as its origin feature.
    #[must_use]
    pub fn reserve(mut self, name: impl Into<String>) -> Self {
        self.reserved.push(name.into());
        self
    }

    /// Checks that `name` cannot collide with a generated feature.
    ///
    /// # Errors
    /// `ValidationError::ReservedFeature` for fixed names, this source's
    /// clue and no-clue features, and names added with [`Self::reserve`].
    pub fn check_origin(&self, name: &str) -> Result<(), ValidationError> {
        let clue_namespace = format!("{}Clue", self.matcher.prefix());
        if names::is_reserved(name)
            || name == self.no_clue_feature
            || name.starts_with(&clue_namespace)
            || self.reserved.iter().any(|r| r == name)
        {
            return Err(ValidationError::ReservedFeature {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// The clue matcher used for property names.
    #[must_use]
    pub const fn matcher(&self) -> &ClueMatcher {
        &self.matcher
    }

    /// Assembles the features of the candidate made from `fact`.
    ///
    /// # Errors
    /// `FanoutError::Validation` if the fact's origin feature collides with a
    /// generated feature and `FanoutError::Relatedness` if the relatedness
    /// scorer fails.
    pub fn assemble(
        &self,
        fact: &Fact,
        question: &QuestionContext,
        clues: &ClueSet,
    ) -> FanoutResult<FeatureVector> {
        self.check_origin(&fact.origin_feature)?;

        let mut fv = FeatureVector::new();
        fv.set(names::OCCURENCES, 1.0);
        fv.set(names::RESULT_LOG_SCORE, (1.0 + RELEVANCE).ln());
        fv.set(fact.origin_feature.clone(), 1.0);
        if let Some(score) = fact.score {
            fv.set(names::PROPERTY_SCORE, score);
        }

        let relatedness = self
            .relatedness
            .relatedness(&question.text, &fact.property)
            .map_err(|source| FanoutError::Relatedness {
                property: fact.property.clone(),
                source,
            })?;
        fv.set(names::PROPERTY_RELATEDNESS_SCORE, relatedness);

        add_concept_features(&mut fv, &question.concepts, &fact.subject);

        let clue_match = self.matcher.match_name(&fact.property, clues);
        if clue_match.matched {
            fv.merge(&clue_match.updates);
        } else {
            fv.set(self.no_clue_feature.clone(), -1.0);
        }

        Ok(fv)
    }
}

impl std::fmt::Debug for FeatureAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureAssembler")
            .field("matcher", &self.matcher)
            .field("no_clue_feature", &self.no_clue_feature)
            .field("reserved", &self.reserved)
            .finish_non_exhaustive()
    }
}

/// Marks the origins of every concept whose label is the fact subject.
fn add_concept_features(fv: &mut FeatureVector, concepts: &[Concept], subject: &str) {
    for concept in concepts.iter().filter(|c| c.matches_subject(subject)) {
        if concept.origin.by_subject {
            fv.set(names::ORIGIN_CONCEPT_BY_SUBJECT, 1.0);
        }
        if concept.origin.by_lat {
            fv.set(names::ORIGIN_CONCEPT_BY_LAT, 1.0);
        }
        if concept.origin.by_ne {
            fv.set(names::ORIGIN_CONCEPT_BY_NE, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::{Clue, ClueKind};
    use crate::error::CollaboratorError;

    struct FixedScorer(f64);

    impl RelatednessScorer for FixedScorer {
        fn relatedness(&self, _: &str, _: &str) -> Result<f64, CollaboratorError> {
            Ok(self.0)
        }
    }

    struct BrokenScorer;

    impl RelatednessScorer for BrokenScorer {
        fn relatedness(&self, _: &str, _: &str) -> Result<f64, CollaboratorError> {
            Err(CollaboratorError::Relatedness("model not loaded".to_string()))
        }
    }

    fn assembler() -> FeatureAssembler {
        FeatureAssembler::new("DBpOnt", "DBpOntNoClue", Arc::new(FixedScorer(0.42)))
    }

    fn fact(subject: &str, property: &str) -> Fact {
        Fact::builder()
            .subject(subject)
            .property(property)
            .value("Ulm")
            .origin_feature("OriginDBpOntology")
            .build()
            .unwrap()
    }

    #[test]
    fn test_fixed_features() {
        let q = QuestionContext::new("q", "Where was Einstein born?");
        let fv = assembler()
            .assemble(&fact("Einstein", "birth place"), &q, &ClueSet::default())
            .unwrap();
        assert_eq!(fv.get(names::OCCURENCES), Some(1.0));
        assert!((fv.get(names::RESULT_LOG_SCORE).unwrap() - 2.0f64.ln()).abs() < 1e-12);
        assert_eq!(fv.get("OriginDBpOntology"), Some(1.0));
        assert_eq!(fv.get(names::PROPERTY_RELATEDNESS_SCORE), Some(0.42));
        assert!(!fv.contains(names::PROPERTY_SCORE));
    }

    #[test]
    fn test_property_score_when_present() {
        let q = QuestionContext::new("q", "x");
        let mut f = fact("Einstein", "birth place");
        f.score = Some(0.8);
        let fv = assembler().assemble(&f, &q, &ClueSet::default()).unwrap();
        assert_eq!(fv.get(names::PROPERTY_SCORE), Some(0.8));
    }

    #[test]
    fn test_no_clue_penalty() {
        let q = QuestionContext::new("q", "x");
        let clues = ClueSet::compile(&[Clue::new(ClueKind::Token, "spouse")]).unwrap();
        let fv = assembler().assemble(&fact("Einstein", "birth place"), &q, &clues).unwrap();
        assert_eq!(fv.get("DBpOntNoClue"), Some(-1.0));
        assert!(fv.names_with_prefix("DBpOntClue").next().is_none());
    }

    #[test]
    fn test_subject_clue_match() {
        let q = QuestionContext::new("q", "x");
        let clues = ClueSet::compile(&[Clue::new(ClueKind::Subject, "birth place")]).unwrap();
        let fv = assembler().assemble(&fact("Einstein", "birth place"), &q, &clues).unwrap();
        assert_eq!(fv.get("DBpOntClueSubject"), Some(1.0));
        assert!(!fv.contains("DBpOntNoClue"));
    }

    #[test]
    fn test_concept_origin_case_insensitive() {
        let q = QuestionContext::new("q", "x")
            .with_concept(Concept::new("Einstein").by_lat())
            .with_concept(Concept::new("Ulm").by_subject().by_ne());
        let fv = assembler()
            .assemble(&fact("einstein", "birth place"), &q, &ClueSet::default())
            .unwrap();
        assert_eq!(fv.get(names::ORIGIN_CONCEPT_BY_LAT), Some(1.0));
        assert!(!fv.contains(names::ORIGIN_CONCEPT_BY_SUBJECT));
        assert!(!fv.contains(names::ORIGIN_CONCEPT_BY_NE));
    }

    #[test]
    fn test_concept_origins_accumulate() {
        let q = QuestionContext::new("q", "x")
            .with_concept(Concept::new("Einstein").by_lat())
            .with_concept(Concept::new("EINSTEIN").by_ne());
        let fv = assembler()
            .assemble(&fact("Einstein", "birth place"), &q, &ClueSet::default())
            .unwrap();
        assert_eq!(fv.get(names::ORIGIN_CONCEPT_BY_LAT), Some(1.0));
        assert_eq!(fv.get(names::ORIGIN_CONCEPT_BY_NE), Some(1.0));
    }

    #[test]
    fn test_origin_cannot_overwrite_generated_features() {
        let a = assembler().reserve("LATDBpOntology");
        let q = QuestionContext::new("q", "x");
        for origin in [
            "PropertyRelatednessScore",
            "Occurences",
            "DBpOntNoClue",
            "DBpOntClueSubject",
            "LATDBpOntology",
        ] {
            // Facts from a knowledge source skip the builder checks.
            let mut f = fact("Einstein", "birth place");
            f.origin_feature = origin.to_string();
            let err = a.assemble(&f, &q, &ClueSet::default()).unwrap_err();
            assert!(
                matches!(err, FanoutError::Validation(ValidationError::ReservedFeature { ref name }) if name == origin),
                "{origin} accepted"
            );
        }
        assert!(a.check_origin("OriginDBpOntology").is_ok());
    }

    #[test]
    fn test_relatedness_failure_propagates() {
        let a = FeatureAssembler::new("P", "PNoClue", Arc::new(BrokenScorer));
        let q = QuestionContext::new("q", "x");
        let err = a
            .assemble(&fact("Einstein", "birth place"), &q, &ClueSet::default())
            .unwrap_err();
        assert!(matches!(err, FanoutError::Relatedness { ref property, .. } if property == "birth place"));
        assert!(err.aborts_cycle());
    }
}
