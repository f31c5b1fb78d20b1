//! Errors raised synchronously by the workflow engine.
//!
//! Every variant is produced before any mutation takes place, so a caller
//! that receives one can assume the store is untouched.

use crate::domain::EntityId;

pub type Result<T, E = WorkflowError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// A required field was empty after trimming.
    #[error("{field} must not be empty")]
    Validation { field: &'static str },

    /// The referenced meal train does not exist.
    #[error("meal train {meal_id} not found")]
    NotFound { meal_id: EntityId },

    /// The operation is not allowed for this actor.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// A join request already exists for this (meal, user) pair.
    #[error("{username} already has a request for meal train {meal_id}")]
    DuplicateRequest { meal_id: EntityId, username: String },

    #[error("identifier space exhausted")]
    IdSpaceExhausted,
}

impl WorkflowError {
    pub(crate) fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}
