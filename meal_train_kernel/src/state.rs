//! Meal train kernel: entity store.
//!
//! In-memory authoritative collections plus the read-only queries used by
//! the workflow engine and by view layers. The store does not validate;
//! mutation happens only through `transitions`.

use crate::domain::{EntityId, JoinRequest, JoinStatus, MealTrain, RequestStatus};

/// Both collections, kept in persisted insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    pub(crate) meals: Vec<MealTrain>,
    pub(crate) requests: Vec<JoinRequest>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted collections.
    pub fn from_parts(meals: Vec<MealTrain>, requests: Vec<JoinRequest>) -> Self {
        Self { meals, requests }
    }

    pub fn into_parts(self) -> (Vec<MealTrain>, Vec<JoinRequest>) {
        (self.meals, self.requests)
    }

    pub fn meals(&self) -> &[MealTrain] {
        &self.meals
    }

    pub fn requests(&self) -> &[JoinRequest] {
        &self.requests
    }

    pub fn meal(&self, id: EntityId) -> Option<&MealTrain> {
        self.meals.iter().find(|m| m.id == id)
    }

    pub fn request(&self, id: EntityId) -> Option<&JoinRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub(crate) fn meal_mut(&mut self, id: EntityId) -> Option<&mut MealTrain> {
        self.meals.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn request_mut(&mut self, id: EntityId) -> Option<&mut JoinRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Largest identifier in either collection, 0 when empty.
    pub fn max_id(&self) -> EntityId {
        let meals = self.meals.iter().map(|m| m.id);
        let requests = self.requests.iter().map(|r| r.id);
        meals.chain(requests).max().unwrap_or(0)
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Every meal train created by someone other than `user`.
    pub fn meals_excluding_creator(&self, user: &str) -> Vec<&MealTrain> {
        self.meals.iter().filter(|m| m.creator != user).collect()
    }

    pub fn meals_by_creator(&self, user: &str) -> Vec<&MealTrain> {
        self.meals.iter().filter(|m| m.creator == user).collect()
    }

    /// The at-most-one request for (`meal_id`, `user`), whatever its status.
    pub fn request_for(&self, meal_id: EntityId, user: &str) -> Option<&JoinRequest> {
        self.requests
            .iter()
            .find(|r| r.meal_id == meal_id && r.username == user)
    }

    /// Pending requests on meals created by `user`, in insertion order.
    pub fn pending_requests_for_creator(&self, user: &str) -> Vec<&JoinRequest> {
        self.requests
            .iter()
            .filter(|r| {
                r.status == RequestStatus::Pending
                    && self.meal(r.meal_id).is_some_and(|m| m.creator == user)
            })
            .collect()
    }

    /// How `user` relates to the meal, or `None` if the meal does not exist.
    pub fn join_status(&self, meal_id: EntityId, user: &str) -> Option<JoinStatus> {
        let meal = self.meal(meal_id)?;
        if meal.creator == user {
            return Some(JoinStatus::Owner);
        }
        Some(
            self.request_for(meal_id, user)
                .map_or(JoinStatus::Available, |r| r.status.into()),
        )
    }
}
