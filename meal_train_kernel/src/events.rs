//! Mutation events.
//!
//! Events are pure data describing a committed change. They carry the
//! affected identifiers only and contain zero transition logic.

use serde::Serialize;

use crate::domain::EntityId;
use crate::state::EntityStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MutationEvent {
    MealTrainCreated {
        meal_id: EntityId,
    },
    JoinRequested {
        request_id: EntityId,
        meal_id: EntityId,
    },
    RequestApproved {
        request_id: EntityId,
        meal_id: EntityId,
        /// False when the user was already a member.
        member_added: bool,
    },
    RequestRejected {
        request_id: EntityId,
        meal_id: EntityId,
    },
}

impl MutationEvent {
    pub fn meal_id(&self) -> EntityId {
        match *self {
            MutationEvent::MealTrainCreated { meal_id }
            | MutationEvent::JoinRequested { meal_id, .. }
            | MutationEvent::RequestApproved { meal_id, .. }
            | MutationEvent::RequestRejected { meal_id, .. } => meal_id,
        }
    }
}

/// Notified after a mutation has been committed, to re-derive views.
pub trait MutationObserver {
    fn on_mutation(&mut self, event: &MutationEvent, store: &EntityStore);
}

impl<F> MutationObserver for F
where
    F: FnMut(&MutationEvent, &EntityStore),
{
    fn on_mutation(&mut self, event: &MutationEvent, store: &EntityStore) {
        (*self)(event, store)
    }
}
