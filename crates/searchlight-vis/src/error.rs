//! Error types for searchlight-vis.

use searchlight_steps::{AlgorithmId, MismatchError};
use thiserror::Error;

/// Result type for searchlight-vis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or serving a run.
#[derive(Debug, Error)]
pub enum Error {
    /// No target was supplied.
    #[error("Please enter a search value or pick a random one.")]
    MissingTarget,

    /// The target text is not a whole number.
    #[error("Please enter a valid search value, {0:?} is not a number.")]
    InvalidTarget(String),

    /// The input does not fit the selected algorithm.
    #[error(transparent)]
    InputMismatch(#[from] MismatchError),

    /// No card is registered for the algorithm.
    #[error("no card for algorithm {0}")]
    UnknownCard(AlgorithmId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error is a user input problem rather than a fault.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}
