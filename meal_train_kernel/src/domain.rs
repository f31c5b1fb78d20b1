//! Meal train kernel: core domain types.
//!
//! Pure data. No behaviour beyond small accessors.
//! Field names serialize in the persisted camelCase layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier shared by meal trains and join requests.
pub type EntityId = u64;

// ── Core Domain Types ──────────────────────────────────────────────

/// A shared meal-preparation sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTrain {
    pub id: EntityId,
    pub name: String,
    pub ingredients: Vec<String>,
    pub creator: String,
    /// Insertion ordered, creator first, never duplicated.
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MealTrain {
    pub fn is_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m == user)
    }

    /// Idempotent union. Returns true if `user` was not yet a member.
    pub(crate) fn add_member(&mut self, user: &str) -> bool {
        if self.is_member(user) {
            return false;
        }
        self.members.push(user.to_string());
        true
    }
}

/// Lifecycle of a join request. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// One user's intent to join one meal train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: EntityId,
    /// Back-reference only; the request never owns the meal.
    pub meal_id: EntityId,
    pub username: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// What a given user can do with a meal train they are looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
    /// The user created the train.
    Owner,
    /// No request exists yet; joining is possible.
    Available,
    Pending,
    Joined,
    Rejected,
}

impl From<RequestStatus> for JoinStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => JoinStatus::Pending,
            RequestStatus::Approved => JoinStatus::Joined,
            RequestStatus::Rejected => JoinStatus::Rejected,
        }
    }
}
