//! Observation Engine Error Hierarchy
//!
//! Defines error types for the change-observation engine, categorized by
//! operational concerns. The observation data path itself is infallible:
//! missing capabilities degrade to a full diff and listener panics are
//! isolated at the dispatch boundary, so errors here cover configuration
//! and background-task lifecycle only.

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (background tasks, shutdown signaling)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    #[error("Failed to send shutdown signal: {0}")]
    ShutdownSignal(String),
}

impl From<JoinError> for Error {
    fn from(err: JoinError) -> Self {
        SystemError::TaskFailed(err).into()
    }
}
