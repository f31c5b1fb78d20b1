#![forbid(unsafe_code)]

//! Meal train kernel.
//!
//! Entities, invariants and the join-request state machine. No I/O:
//! persistence and sessions live in `meal_train_runtime`.

pub mod domain;
pub mod error;
pub mod events;
pub mod ids;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod engine;

pub use domain::{EntityId, JoinRequest, JoinStatus, MealTrain, RequestStatus};
pub use engine::WorkflowEngine;
pub use error::WorkflowError;
pub use events::{MutationEvent, MutationObserver};
pub use state::EntityStore;
