//! Meal train kernel: transition logic.
//!
//! ALL state mutation lives here. Each handler checks its preconditions in
//! order and returns before touching the store if any fails, so a raised
//! error never leaves a partial change behind.

use crate::domain::{EntityId, JoinRequest, MealTrain, RequestStatus};
use crate::error::{Result, WorkflowError};
use crate::events::MutationEvent;
use crate::ids::{Clock, IdGenerator};
use crate::state::EntityStore;

/// Split on line breaks, trim each line, drop blank ones.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn create_meal_train(
    store: &mut EntityStore,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
    name: &str,
    ingredients_text: &str,
    creator: &str,
) -> Result<MutationEvent> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkflowError::Validation { field: "name" });
    }

    let meal = MealTrain {
        id: ids.next_id()?,
        name: name.to_string(),
        ingredients: parse_ingredients(ingredients_text),
        creator: creator.to_string(),
        members: vec![creator.to_string()],
        created_at: clock.now(),
    };
    let meal_id = meal.id;
    store.meals.push(meal);

    Ok(MutationEvent::MealTrainCreated { meal_id })
}

pub(crate) fn request_to_join(
    store: &mut EntityStore,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
    meal_id: EntityId,
    user: &str,
) -> Result<MutationEvent> {
    let meal = store
        .meal(meal_id)
        .ok_or(WorkflowError::NotFound { meal_id })?;
    if meal.creator == user {
        return Err(WorkflowError::invalid_operation(
            "the creator of a meal train is already a member",
        ));
    }
    if store.request_for(meal_id, user).is_some() {
        return Err(WorkflowError::DuplicateRequest {
            meal_id,
            username: user.to_string(),
        });
    }

    let request = JoinRequest {
        id: ids.next_id()?,
        meal_id,
        username: user.to_string(),
        status: RequestStatus::Pending,
        created_at: clock.now(),
    };
    let request_id = request.id;
    store.requests.push(request);

    Ok(MutationEvent::JoinRequested {
        request_id,
        meal_id,
    })
}

/// `None` when the request is missing, rejected, or already approved with
/// its user already a member.
pub(crate) fn approve_request(
    store: &mut EntityStore,
    request_id: EntityId,
) -> Option<MutationEvent> {
    let request = store.request_mut(request_id)?;
    let was_pending = match request.status {
        RequestStatus::Pending => true,
        RequestStatus::Approved => false,
        RequestStatus::Rejected => return None,
    };
    request.status = RequestStatus::Approved;
    let meal_id = request.meal_id;
    let username = request.username.clone();

    let member_added = store
        .meal_mut(meal_id)
        .is_some_and(|meal| meal.add_member(&username));

    if !was_pending && !member_added {
        return None;
    }
    Some(MutationEvent::RequestApproved {
        request_id,
        meal_id,
        member_added,
    })
}

/// `None` when the request is missing or already terminal.
pub(crate) fn reject_request(
    store: &mut EntityStore,
    request_id: EntityId,
) -> Option<MutationEvent> {
    let request = store.request_mut(request_id)?;
    if request.status.is_terminal() {
        return None;
    }
    request.status = RequestStatus::Rejected;

    Some(MutationEvent::RequestRejected {
        request_id,
        meal_id: request.meal_id,
    })
}
