//! Training-data dump of property labels.
//!
//! When enabled, every (question, fact) pair appends one line to
//! `<dir>/<questionId>-prop.txt`:
//!
//! ```text
//! <Q> Where was Einstein born?
//! 1 2 birth place
//! 0 0 spouse
//! ```
//!
//! The first column is 1 if the candidate text matches the question's
//! answer pattern, the second is the number of clues matching the
//! property name. The header line is written once, when the file is new.
//! The dump is a diagnostic side channel: [`PropertyLabelWriter::record`]
//! logs failures and never returns them.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use regex::RegexBuilder;
use thiserror::Error;

use crate::question::QuestionContext;

/// Number of process-wide dump file locks.
const LOCK_STRIPES: usize = 64;

/// Writers to the same path serialize on the same stripe, whichever
/// `PropertyLabelWriter` instance they go through.
static FILE_LOCKS: [Mutex<()>; LOCK_STRIPES] = {
    #[allow(clippy::declare_interior_mutable_const)]
    const UNLOCKED: Mutex<()> = Mutex::new(());
    [UNLOCKED; LOCK_STRIPES]
};

fn stripe(path: &Path) -> usize {
    let hash = blake3::hash(path.to_string_lossy().as_bytes());
    let mut bucket = [0u8; 8];
    bucket.copy_from_slice(&hash.as_bytes()[..8]);
    #[allow(clippy::cast_possible_truncation)]
    let idx = (u64::from_le_bytes(bucket) % LOCK_STRIPES as u64) as usize;
    idx
}

fn lock_path(path: &Path) -> MutexGuard<'static, ()> {
    // The lock guards no data, so a poisoned stripe is still usable.
    FILE_LOCKS[stripe(path)]
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Errors of the dump side channel.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump file could not be written.
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Dump file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The question's answer pattern does not compile.
    #[error("Invalid answer pattern '{pattern}': {reason}")]
    AnswerPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// The question id cannot be used as a file name.
    #[error("Question id '{id}' is not a plain file name")]
    InvalidQuestionId {
        /// The offending id.
        id: String,
    },
}

/// Appends property-label lines, one file per question.
///
/// Writes to the same file are serialized process-wide, so generators of
/// different sources may each hold their own writer for one directory.
#[derive(Debug, Clone)]
pub struct PropertyLabelWriter {
    dir: PathBuf,
}

impl PropertyLabelWriter {
    /// Creates a writer dumping into `dir`; the directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Dump directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Dump file of a question.
    ///
    /// # Errors
    /// `DumpError::InvalidQuestionId` unless the id is a single plain path
    /// component (no separators, not `.` or `..`).
    pub fn path_for(&self, question_id: &str) -> Result<PathBuf, DumpError> {
        let mut components = Path::new(question_id).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !question_id.contains(['/', '\\', '\0']);
        if !plain {
            return Err(DumpError::InvalidQuestionId {
                id: question_id.to_string(),
            });
        }
        Ok(self.dir.join(format!("{question_id}-prop.txt")))
    }

    /// Records one fact, logging and swallowing any failure.
    pub fn record(&self, question: &QuestionContext, clue_matches: usize, property: &str, answer_text: &str) {
        if let Err(e) = self.try_record(question, clue_matches, property, answer_text) {
            tracing::warn!(error = %e, question = %question.question_id, "property label dump failed");
        }
    }

    /// Records one fact.
    ///
    /// Returns `Ok(false)` without writing if the question carries no
    /// answer pattern.
    ///
    /// # Errors
    /// `DumpError` if the question id is not a plain file name, the pattern
    /// does not compile or the file cannot be written.
    pub fn try_record(
        &self,
        question: &QuestionContext,
        clue_matches: usize,
        property: &str,
        answer_text: &str,
    ) -> Result<bool, DumpError> {
        let Some(pattern) = question.answer_pattern.as_deref() else {
            tracing::debug!(question = %question.question_id, "no answer pattern, skipping label dump");
            return Ok(false);
        };
        let answer = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DumpError::AnswerPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        let label = u8::from(answer.is_match(answer_text));

        let path = self.path_for(&question.question_id)?;
        let _guard = lock_path(&path);

        let io_err = |source| DumpError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let is_new = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = BufWriter::new(file);
        if is_new {
            writeln!(writer, "<Q> {}", question.text).map_err(io_err)?;
        }
        writeln!(writer, "{label} {clue_matches} {property}").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(true)
    }
}
