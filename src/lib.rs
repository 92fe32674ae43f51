//! # propsearch - Structured-Source Primary Search
//!
//! propsearch turns an analyzed question into candidate answers drawn from
//! structured knowledge sources (DBpedia ontology and raw properties,
//! Freebase). Every fact known about a question concept becomes one
//! candidate, scored with a feature vector for a downstream ranker.
//!
//! ## Core Concepts
//!
//! - **Concept**: an entity or topic nominated by question analysis
//! - **Clue**: a question phrase, matched against property names
//! - **Fact**: one (subject, property, value) triple from a knowledge source
//! - **CandidateAnswer**: a fact rendered as an answer, with features and provenance
//! - **FanoutGenerator**: expands one question into a finite candidate stream
//!   that always ends in exactly one record marked last
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use propsearch::{
//!     CandidateBuilder, CloneCopier, Concept, DbpOntologySource, Fact, FanoutGenerator,
//!     InMemoryKnowledgeSource, InMemoryProvenanceStore, LexicalRelatedness, QuestionContext,
//! };
//!
//! let knowledge = Arc::new(InMemoryKnowledgeSource::new());
//! knowledge.insert(
//!     "Einstein",
//!     Fact::builder()
//!         .subject("Einstein")
//!         .property("birth place")
//!         .value("Ulm")
//!         .origin_feature("OriginDBpOntology")
//!         .build()?,
//! )?;
//!
//! let builder = CandidateBuilder::new(
//!     Arc::new(DbpOntologySource::new(knowledge)),
//!     Arc::new(LexicalRelatedness::default()),
//!     Arc::new(InMemoryProvenanceStore::new()),
//! );
//! let mut generator = FanoutGenerator::new(builder, Arc::new(CloneCopier));
//!
//! let question = QuestionContext::new("q1", "Where was Einstein born?")
//!     .with_concept(Concept::new("Einstein"));
//! generator.begin(&question)?;
//! while generator.has_more()? {
//!     let record = generator.produce_next()?;
//!     println!("{} (last: {})", record.candidate.text, record.candidate.is_last);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Input records
pub mod clue;
pub mod concept;
pub mod error;
pub mod fact;
pub mod features;
pub mod question;

// Collaborators
pub mod collaborators;
pub mod provenance;
pub mod relatedness;

// Candidate construction
pub mod adapter;
pub mod assemble;
pub mod candidate;
pub mod lat;
pub mod matcher;

// Fan-out
pub mod config;
pub mod dump;
pub mod generator;
pub mod pool;

// Re-export primary types at crate root for convenience
pub use adapter::{DbpOntologySource, DbpPropertySource, FreebaseSource, SourceProfile, StructuredSource};
pub use assemble::{FeatureAssembler, RELEVANCE};
pub use candidate::{AnswerResource, CandidateAnswer, CandidateBuilder};
pub use clue::{Clue, ClueKind, ClueSet};
pub use collaborators::{InMemoryKnowledgeSource, KnowledgeSource, RelatednessScorer};
pub use concept::{Concept, ConceptOrigin};
pub use config::FanoutConfig;
pub use dump::{DumpError, PropertyLabelWriter};
pub use error::{CollaboratorError, FanoutError, FanoutResult, PoolError, UsageError, ValidationError};
pub use fact::{Fact, FactBuilder};
pub use features::FeatureVector;
pub use generator::{CandidateStream, CycleId, CycleState, FanoutGenerator, OutputRecord};
pub use lat::{PosTag, TypeTag};
pub use matcher::{ClueMatch, ClueMatcher};
pub use pool::{OutputPool, PoolLease};
pub use provenance::{
    AnswerId, AnswerSource, AnsweringProperty, IdGenerator, InMemoryProvenanceStore, ProvenanceStore,
    SnippetId, SourceId, StructuredKind,
};
pub use question::{CloneCopier, ContextCopier, QuestionContext};
pub use relatedness::LexicalRelatedness;
