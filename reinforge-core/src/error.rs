//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// The variants separate faults of the environment, which the trainer recovers from
/// by dropping the current episode, from everything else, which stops training.
#[derive(Error, Debug)]
pub enum ReinforgeError {
    /// The environment failed while resetting or stepping.
    #[error("environment fault in episode {episode}: {source}")]
    Environment {
        /// Episode in which the fault occurred.
        episode: usize,

        /// Error reported by the environment.
        #[source]
        source: anyhow::Error,
    },

    /// The agent failed to select an action or to update its parameters.
    #[error("agent error: {0}")]
    Agent(#[source] anyhow::Error),

    /// A value that must be finite was not.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Saving a checkpoint failed.
    #[error("failed to write checkpoint {path:?}: {source}")]
    Checkpoint {
        /// Path of the checkpoint.
        path: PathBuf,

        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Record key error.
    #[error("record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("record value type error: {0}")]
    RecordValueTypeError(String),
}

impl ReinforgeError {
    /// Returns `true` if the error is a fault of the environment.
    ///
    /// Such errors abort only the current episode.
    pub fn is_environment_fault(&self) -> bool {
        matches!(self, Self::Environment { .. })
    }
}
