//! Meal train kernel: invariant checks.
//!
//! Returns the first violation found. The engine asserts these after every
//! mutation in debug builds; the runtime runs them after loading persisted
//! state.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{EntityId, RequestStatus};
use crate::state::EntityStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    CreatorNotMember { meal_id: EntityId },
    DuplicateMember { meal_id: EntityId, user: String },
    DanglingRequest { request_id: EntityId, meal_id: EntityId },
    SelfRequest { request_id: EntityId },
    DuplicateRequest { meal_id: EntityId, user: String },
    ApprovedNotMember { request_id: EntityId },
    DuplicateId { id: EntityId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatorNotMember { meal_id } => {
                write!(f, "[INVARIANT:creator_member] meal {meal_id} does not list its creator")
            }
            Self::DuplicateMember { meal_id, user } => {
                write!(f, "[INVARIANT:unique_members] meal {meal_id} lists {user:?} twice")
            }
            Self::DanglingRequest { request_id, meal_id } => write!(
                f,
                "[INVARIANT:request_refs] request {request_id} references missing meal {meal_id}"
            ),
            Self::SelfRequest { request_id } => write!(
                f,
                "[INVARIANT:no_self_request] request {request_id} was made by the meal's creator"
            ),
            Self::DuplicateRequest { meal_id, user } => write!(
                f,
                "[INVARIANT:unique_request] {user:?} has more than one request for meal {meal_id}"
            ),
            Self::ApprovedNotMember { request_id } => write!(
                f,
                "[INVARIANT:approved_member] approved request {request_id} has no matching member"
            ),
            Self::DuplicateId { id } => write!(f, "[INVARIANT:unique_ids] id {id} is used twice"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn check_invariants(store: &EntityStore) -> Result<(), InvariantViolation> {
    check_unique_ids(store)?;
    check_membership(store)?;
    check_requests(store)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_unique_ids(store: &EntityStore) -> Result<(), InvariantViolation> {
    let mut seen = BTreeSet::new();
    let meal_ids = store.meals().iter().map(|m| m.id);
    let request_ids = store.requests().iter().map(|r| r.id);
    for id in meal_ids.chain(request_ids) {
        if !seen.insert(id) {
            return Err(InvariantViolation::DuplicateId { id });
        }
    }
    Ok(())
}

fn check_membership(store: &EntityStore) -> Result<(), InvariantViolation> {
    for meal in store.meals() {
        if !meal.is_member(&meal.creator) {
            return Err(InvariantViolation::CreatorNotMember { meal_id: meal.id });
        }
        let mut seen = BTreeSet::new();
        for member in &meal.members {
            if !seen.insert(member.as_str()) {
                return Err(InvariantViolation::DuplicateMember {
                    meal_id: meal.id,
                    user: member.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_requests(store: &EntityStore) -> Result<(), InvariantViolation> {
    let mut pairs = BTreeSet::new();
    for request in store.requests() {
        let meal = store
            .meal(request.meal_id)
            .ok_or(InvariantViolation::DanglingRequest {
                request_id: request.id,
                meal_id: request.meal_id,
            })?;
        if meal.creator == request.username {
            return Err(InvariantViolation::SelfRequest { request_id: request.id });
        }
        if !pairs.insert((request.meal_id, request.username.as_str())) {
            return Err(InvariantViolation::DuplicateRequest {
                meal_id: request.meal_id,
                user: request.username.clone(),
            });
        }
        if request.status == RequestStatus::Approved && !meal.is_member(&request.username) {
            return Err(InvariantViolation::ApprovedNotMember { request_id: request.id });
        }
    }
    Ok(())
}
