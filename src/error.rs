//! Error kinds for the personality and dialogue pipeline
//!
//! None of these are fatal to the process: each one is local to a single
//! NPC-creation attempt or a single conversation turn.

use crate::personality::Trait;

/// Strict extraction could not find or parse a trait
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("trait `{0}` not found in response")]
    Missing(Trait),
    #[error("trait `{name}` has an unparsable value `{value}`")]
    Unparsable { name: Trait, value: String },
}

/// A text-generation call failed or timed out
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation timed out: {0}")]
    TimedOut(String),
    #[error("text generation failed: {0}")]
    Failed(String),
}

impl GenerationError {
    /// Underlying cause without the timed-out/failed prefix
    pub fn message(&self) -> &str {
        match self {
            GenerationError::TimedOut(message) | GenerationError::Failed(message) => message,
        }
    }
}

/// Manually supplied trait value was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("expected an integer for {name}, got `{input}`")]
    NotAnInteger { name: Trait, input: String },
    #[error("{name} must be between 0 and 100, got {value}")]
    OutOfRange { name: Trait, value: i64 },
}

/// Failure reported by a concrete text-generation backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("backend returned HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Creating an NPC through the backend failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NpcCreationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("could not extract a personality after {attempts} attempt(s): {source}")]
    Extraction { attempts: u32, source: ExtractionError },
}

impl From<BackendError> for GenerationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout => GenerationError::TimedOut(BackendError::Timeout.to_string()),
            other => GenerationError::Failed(other.to_string()),
        }
    }
}
