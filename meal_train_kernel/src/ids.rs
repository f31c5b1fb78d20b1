//! Identity generation and time sources.
//!
//! Both are injected into the engine rather than read from ambient state,
//! so tests can pin identifiers and timestamps.

use chrono::{DateTime, Utc};

use crate::domain::EntityId;
use crate::error::{Result, WorkflowError};

/// Issues identifiers that are unique within one store.
pub trait IdGenerator {
    fn next_id(&mut self) -> Result<EntityId>;
}

/// Strictly increasing counter.
///
/// Seed it with [`MonotonicIds::above`] using the largest identifier already
/// present in loaded state so freshly issued IDs never collide with
/// persisted ones.
#[derive(Debug, Clone)]
pub struct MonotonicIds {
    last: EntityId,
}

impl MonotonicIds {
    /// A counter whose first issued ID is `floor + 1`.
    pub fn above(floor: EntityId) -> Self {
        Self { last: floor }
    }

    /// The most recently issued (or seeded) identifier.
    pub fn last(&self) -> EntityId {
        self.last
    }
}

impl Default for MonotonicIds {
    fn default() -> Self {
        Self::above(0)
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&mut self) -> Result<EntityId> {
        let next = self
            .last
            .checked_add(1)
            .ok_or(WorkflowError::IdSpaceExhausted)?;
        self.last = next;
        Ok(next)
    }
}

/// Source of creation timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
