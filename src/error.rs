//! Error types for propsearch.
//!
//! All errors are strongly typed using thiserror so the host scheduler can
//! tell a failed collaborator apart from a programming error and decide
//! whether to retry, skip, or abort the question.

use thiserror::Error;

/// Failures reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The knowledge source could not resolve a concept.
    #[error("Knowledge source error: {0}")]
    KnowledgeSource(String),

    /// The relatedness scorer failed.
    #[error("Relatedness scorer error: {0}")]
    Relatedness(String),

    /// The provenance store rejected a record.
    #[error("Provenance store error: {0}")]
    Provenance(String),

    /// The question context could not be duplicated.
    #[error("Context copy error: {0}")]
    ContextCopy(String),
}

/// Programming errors in driving a generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("generation cycle has not been started")]
    NotStarted,

    #[error("generation cycle already emitted its last record")]
    CycleFinished,

    #[error("generation cycle is still emitting")]
    CycleInProgress,
}

/// Output-container pool failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("output pool exhausted (capacity: {capacity})")]
    Exhausted {
        capacity: usize,
    },
}

/// Validation errors that occur while building input records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Property name cannot be empty")]
    EmptyProperty,

    #[error("Origin feature '{name}' collides with a generated feature")]
    ReservedFeature {
        name: String,
    },

    #[error("Pattern '{pattern}' does not compile: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },
}

/// Top-level error type for propsearch.
#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Fetching facts for concept '{concept}' failed: {source}")]
    Fetch {
        concept: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("Scoring relatedness of property '{property}' failed: {source}")]
    Relatedness {
        property: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("Recording provenance failed: {0}")]
    Provenance(#[source] CollaboratorError),

    #[error("Copying question context failed: {0}")]
    ContextCopy(#[source] CollaboratorError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FanoutError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a programming error.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Returns true if a collaborator reported the failure.
    #[must_use]
    pub const fn is_collaborator(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Relatedness { .. } | Self::Provenance(_) | Self::ContextCopy(_)
        )
    }

    /// Returns true if the failure ends the generation cycle it happened in.
    #[must_use]
    pub const fn aborts_cycle(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Relatedness { .. } | Self::Provenance(_) | Self::Internal { .. }
        )
    }

    /// Returns true if `produce_next` may be called again after this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ContextCopy(_) | Self::Pool(_))
    }
}

/// Result type alias for propsearch operations.
pub type FanoutResult<T> = Result<T, FanoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_pattern() {
        let err = ValidationError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("unclosed group"));
    }

    #[test]
    fn test_fetch_error_names_concept() {
        let err = FanoutError::Fetch {
            concept: "Einstein".to_string(),
            source: CollaboratorError::KnowledgeSource("timeout".to_string()),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Einstein"));
        assert!(err.is_collaborator());
        assert!(err.aborts_cycle());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_usage_error_from() {
        let err: FanoutError = UsageError::CycleFinished.into();
        assert!(err.is_usage());
        assert!(!err.aborts_cycle());
        assert!(format!("{err}").contains("last record"));
    }

    #[test]
    fn test_context_copy_is_retryable() {
        let err = FanoutError::ContextCopy(CollaboratorError::ContextCopy("oom".to_string()));
        assert!(err.is_collaborator());
        assert!(!err.aborts_cycle());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_pool_error_display() {
        let err: FanoutError = PoolError::Exhausted { capacity: 8 }.into();
        assert!(err.is_retryable());
        assert!(format!("{err}").contains("capacity: 8"));
    }

    #[test]
    fn test_internal_error() {
        let err = FanoutError::internal("poisoned lock");
        assert!(err.aborts_cycle());
        assert!(format!("{err}").contains("poisoned lock"));
    }
}
