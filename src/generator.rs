//! The fan-out generator.
//!
//! One question goes in, a finite stream of candidate answers comes out.
//! [`FanoutGenerator::begin`] collects every fact of every question concept
//! up front; [`FanoutGenerator::has_more`] and
//! [`FanoutGenerator::produce_next`] then pull one candidate at a time.
//!
//! ```text
//! IDLE --begin--> EMITTING --last record--> DONE
//!                    |                        |
//!                    +--fatal error--> ABORTED |
//!                                        |     |
//!                       begin <----------+-----+
//! ```
//!
//! Every cycle emits at least one record: a question without facts yields
//! a single dummy candidate. Exactly one record per cycle has `is_last` set
//! and it is the final one.
//!
//! # Thread Safety
//! A generator drives one cycle at a time and is not reentrant; the host
//! runs one generator per concurrent job. Generators share only their
//! collaborators and the output pool.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::{CandidateAnswer, CandidateBuilder};
use crate::clue::ClueSet;
use crate::config::FanoutConfig;
use crate::dump::PropertyLabelWriter;
use crate::error::{FanoutError, FanoutResult, UsageError};
use crate::fact::Fact;
use crate::pool::{OutputPool, PoolLease};
use crate::question::{ContextCopier, QuestionContext};

/// Identifier of one generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    /// Creates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable state of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle has been started.
    Idle,
    /// A cycle has records left to emit.
    Emitting,
    /// The last record of the cycle was emitted.
    Done,
    /// The cycle failed and emits nothing more.
    Aborted,
}

/// Facts captured for one question, plus emission progress.
#[derive(Debug)]
struct GenerationCycle {
    id: CycleId,
    question: QuestionContext,
    clues: ClueSet,
    facts: Vec<Fact>,
    cursor: usize,
    emitted: usize,
}

impl GenerationCycle {
    fn has_more(&self) -> bool {
        self.cursor < self.facts.len() || self.emitted == 0
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Emitting(GenerationCycle),
    Done,
    Aborted,
}

/// One emitted record: the candidate and the question copy it belongs to.
///
/// Holds a pool slot while alive when the generator is pooled; dropping the
/// record or calling [`OutputRecord::release`] returns the slot.
#[derive(Debug)]
pub struct OutputRecord {
    /// Isolated copy of the question for this candidate.
    pub question: QuestionContext,
    /// The candidate answer.
    pub candidate: CandidateAnswer,
    /// Cycle that produced the record.
    pub cycle_id: CycleId,
    lease: Option<PoolLease>,
}

impl OutputRecord {
    /// Returns true if the record holds a pool slot.
    #[must_use]
    pub const fn is_leased(&self) -> bool {
        self.lease.is_some()
    }

    /// Returns the pool slot early, keeping the record's contents.
    pub fn release(&mut self) {
        self.lease = None;
    }

    /// Splits the record into its question copy and candidate, releasing
    /// the pool slot.
    #[must_use]
    pub fn into_parts(self) -> (QuestionContext, CandidateAnswer) {
        (self.question, self.candidate)
    }
}

/// Expands questions into candidate answers from one structured source.
pub struct FanoutGenerator {
    builder: CandidateBuilder,
    copier: Arc<dyn ContextCopier>,
    pool: Option<Arc<OutputPool>>,
    dump: Option<Arc<PropertyLabelWriter>>,
    phase: Phase,
}

impl FanoutGenerator {
    /// Creates an unpooled generator without training dump.
    #[must_use]
    pub fn new(builder: CandidateBuilder, copier: Arc<dyn ContextCopier>) -> Self {
        Self {
            builder,
            copier,
            pool: None,
            dump: None,
            phase: Phase::Idle,
        }
    }

    /// Creates a generator wired as `config` describes.
    ///
    /// `pool` is shared by every generator of the host; pass the same
    /// handle to each. Each generator gets its own dump writer; writes to
    /// one question file are still serialized across all of them.
    #[must_use]
    pub fn from_config(
        builder: CandidateBuilder,
        copier: Arc<dyn ContextCopier>,
        pool: Arc<OutputPool>,
        config: &FanoutConfig,
    ) -> Self {
        let generator = Self::new(builder, copier).with_pool(pool);
        match config.label_writer() {
            Some(writer) => generator.with_dump(Arc::new(writer)),
            None => generator,
        }
    }

    /// Leases a pool slot for every emitted record.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<OutputPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Dumps a property label for every emitted fact.
    #[must_use]
    pub fn with_dump(mut self, dump: Arc<PropertyLabelWriter>) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Number of output containers a generator type needs for `max_jobs`
    /// concurrent jobs.
    #[must_use]
    pub const fn instances_required(max_jobs: usize) -> usize {
        OutputPool::instances_required(max_jobs)
    }

    /// The candidate builder.
    #[must_use]
    pub const fn builder(&self) -> &CandidateBuilder {
        &self.builder
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CycleState {
        match self.phase {
            Phase::Idle => CycleState::Idle,
            Phase::Emitting(_) => CycleState::Emitting,
            Phase::Done => CycleState::Done,
            Phase::Aborted => CycleState::Aborted,
        }
    }

    /// Id of the cycle being emitted.
    #[must_use]
    pub const fn cycle_id(&self) -> Option<CycleId> {
        match &self.phase {
            Phase::Emitting(cycle) => Some(cycle.id),
            _ => None,
        }
    }

    /// Starts a cycle for `question`.
    ///
    /// Fetches the facts of every concept, in concept order, before any
    /// record is produced.
    ///
    /// # Errors
    /// - `UsageError::CycleInProgress` if the previous cycle still has records
    /// - `FanoutError::Validation` if a clue does not compile or a fact's
    ///   origin feature collides with a generated feature
    /// - `FanoutError::Fetch` if the source fails for a concept
    ///
    /// The generator is ABORTED after a validation or fetch failure.
    pub fn begin(&mut self, question: &QuestionContext) -> FanoutResult<CycleId> {
        if matches!(self.phase, Phase::Emitting(_)) {
            return Err(UsageError::CycleInProgress.into());
        }

        let cycle = match self.collect(question) {
            Ok(cycle) => cycle,
            Err(e) => {
                self.phase = Phase::Aborted;
                return Err(e);
            }
        };
        let id = cycle.id;
        tracing::debug!(
            cycle = %id,
            question = %question.question_id,
            concepts = question.concepts.len(),
            facts = cycle.facts.len(),
            "collected structured facts"
        );
        self.phase = Phase::Emitting(cycle);
        Ok(id)
    }

    fn collect(&self, question: &QuestionContext) -> FanoutResult<GenerationCycle> {
        let clues = ClueSet::compile(&question.clues)?;
        let source = self.builder.source();

        let mut facts = Vec::new();
        for concept in &question.concepts {
            let found = source
                .concept_facts(question, concept)
                .map_err(|source| FanoutError::Fetch {
                    concept: concept.full_label.clone(),
                    source,
                })?;
            for fact in &found {
                self.builder.check_fact(fact)?;
            }
            facts.extend(found);
        }

        Ok(GenerationCycle {
            id: CycleId::new(),
            question: question.clone(),
            clues,
            facts,
            cursor: 0,
            emitted: 0,
        })
    }

    /// Returns true while the current cycle has records left.
    ///
    /// # Errors
    /// `UsageError::NotStarted` before the first `begin`.
    pub fn has_more(&self) -> FanoutResult<bool> {
        match &self.phase {
            Phase::Idle => Err(UsageError::NotStarted.into()),
            Phase::Emitting(cycle) => Ok(cycle.has_more()),
            Phase::Done | Phase::Aborted => Ok(false),
        }
    }

    /// Produces the next record of the current cycle.
    ///
    /// # Errors
    /// - `UsageError::NotStarted` before the first `begin`
    /// - `UsageError::CycleFinished` after the last record or an abort
    /// - `FanoutError::Pool` / `FanoutError::ContextCopy`: nothing was
    ///   consumed, the call may be retried
    /// - `FanoutError::Relatedness` / `FanoutError::Provenance`: the cycle
    ///   is aborted
    pub fn produce_next(&mut self) -> FanoutResult<OutputRecord> {
        let cycle = match &mut self.phase {
            Phase::Idle => return Err(UsageError::NotStarted.into()),
            Phase::Done | Phase::Aborted => return Err(UsageError::CycleFinished.into()),
            Phase::Emitting(cycle) => cycle,
        };

        let lease = match &self.pool {
            Some(pool) => Some(pool.try_acquire()?),
            None => None,
        };
        let question = self
            .copier
            .copy_context(&cycle.question)
            .map_err(FanoutError::ContextCopy)?;

        let built = match cycle.facts.get(cycle.cursor) {
            Some(fact) => {
                let is_last = cycle.cursor + 1 == cycle.facts.len();
                let built = self
                    .builder
                    .build(fact, is_last, &cycle.question, &cycle.clues);
                if let (Ok(candidate), Some(dump)) = (&built, &self.dump) {
                    let clue_matches = self.builder.clue_matches(&fact.property, &cycle.clues);
                    dump.record(&cycle.question, clue_matches, &fact.property, &candidate.text);
                }
                built
            }
            None if cycle.emitted == 0 => Ok(self.builder.build_dummy(true)),
            None => Err(FanoutError::internal("emitting cycle has no records left")),
        };

        let candidate = match built {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::debug!(cycle = %cycle.id, error = %e, "generation cycle aborted");
                self.phase = Phase::Aborted;
                return Err(e);
            }
        };

        cycle.cursor = (cycle.cursor + 1).min(cycle.facts.len());
        cycle.emitted += 1;
        let cycle_id = cycle.id;
        if candidate.is_last {
            self.phase = Phase::Done;
        }

        Ok(OutputRecord {
            question,
            candidate,
            cycle_id,
            lease,
        })
    }

    /// Pulls the rest of the current cycle as an iterator.
    ///
    /// The iterator ends after the last record or after yielding the first
    /// error.
    pub fn stream(&mut self) -> CandidateStream<'_> {
        CandidateStream {
            generator: self,
            failed: false,
        }
    }

    /// Runs a whole cycle for `question`.
    ///
    /// Records keep their pool slots until dropped, so a pooled generator
    /// needs a pool at least as large as the cycle.
    ///
    /// # Errors
    /// The first error of `begin` or of any `produce_next`.
    pub fn generate_all(&mut self, question: &QuestionContext) -> FanoutResult<Vec<OutputRecord>> {
        self.begin(question)?;
        self.stream().collect()
    }
}

impl fmt::Debug for FanoutGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutGenerator")
            .field("builder", &self.builder)
            .field("pool", &self.pool)
            .field("dump", &self.dump)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Iterator over the remaining records of a cycle.
#[derive(Debug)]
pub struct CandidateStream<'a> {
    generator: &'a mut FanoutGenerator,
    failed: bool,
}

impl Iterator for CandidateStream<'_> {
    type Item = FanoutResult<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = match self.generator.has_more() {
            Ok(false) => return None,
            Ok(true) => self.generator.produce_next(),
            Err(e) => Err(e),
        };
        self.failed = next.is_err();
        Some(next)
    }
}
