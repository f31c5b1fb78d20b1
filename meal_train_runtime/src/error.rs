//! Runtime error types.

use meal_train_kernel::WorkflowError;

/// Failure to write state through the blob store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("blob store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("no user is logged in")]
    NotLoggedIn,
}

pub type Result<T, E = SessionError> = core::result::Result<T, E>;
