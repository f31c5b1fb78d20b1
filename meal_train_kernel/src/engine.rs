//! Meal train kernel: request workflow engine.
//!
//! Top-level orchestrator. Owns the entity store, delegates mutation to
//! `transitions`, and asserts invariants after every change.
//!
//! The engine performs no I/O. Callers persist after each returned
//! `MutationEvent` and re-query the store to refresh their views.

use tracing::{debug, info, warn};

use crate::domain::EntityId;
use crate::error::Result;
use crate::events::MutationEvent;
use crate::ids::{Clock, IdGenerator, MonotonicIds, SystemClock};
use crate::invariants::check_invariants;
use crate::state::EntityStore;
use crate::transitions;

pub struct WorkflowEngine {
    store: EntityStore,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    /// Whether the store satisfied every invariant when it was handed over.
    /// Mutations are only checked against stores that started out sound.
    consistent: bool,
}

impl WorkflowEngine {
    /// Wrap a loaded store, seeding identifiers above everything in it.
    pub fn new(store: EntityStore) -> Self {
        let ids = MonotonicIds::above(store.max_id());
        Self::with_services(store, Box::new(ids), Box::new(SystemClock))
    }

    pub fn with_services(
        store: EntityStore,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let consistent = match check_invariants(&store) {
            Ok(()) => true,
            Err(violation) => {
                warn!("store handed to engine is inconsistent: {violation}");
                false
            }
        };
        Self {
            store,
            ids,
            clock,
            consistent,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// False when the current store broke an invariant on arrival.
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Swap in different contents, returning the previous ones.
    ///
    /// The identifier generator is not rewound, so IDs issued before the
    /// swap are never reissued.
    pub fn replace_store(&mut self, store: EntityStore) -> EntityStore {
        self.consistent = check_invariants(&store).is_ok();
        std::mem::replace(&mut self.store, store)
    }

    /// Create a meal train whose only member is `creator`.
    ///
    /// Fails with `Validation` if `name` is blank. Ingredients are taken one
    /// per line with blank lines dropped; an empty list is allowed.
    pub fn create_meal_train(
        &mut self,
        name: &str,
        ingredients_text: &str,
        creator: &str,
    ) -> Result<MutationEvent> {
        let event = transitions::create_meal_train(
            &mut self.store,
            &mut *self.ids,
            &*self.clock,
            name,
            ingredients_text,
            creator,
        )?;
        info!(meal_id = event.meal_id(), creator, "meal train created");
        self.debug_check();
        Ok(event)
    }

    /// Record a pending request by `user` to join `meal_id`.
    ///
    /// Checked in order: the meal exists (`NotFound`), `user` is not its
    /// creator (`InvalidOperation`), no request of any status exists for the
    /// pair (`DuplicateRequest`).
    pub fn request_to_join(&mut self, meal_id: EntityId, user: &str) -> Result<MutationEvent> {
        let event = transitions::request_to_join(
            &mut self.store,
            &mut *self.ids,
            &*self.clock,
            meal_id,
            user,
        )?;
        info!(meal_id, user, "join request created");
        self.debug_check();
        Ok(event)
    }

    /// Approve a request and union its user into the meal's members.
    ///
    /// Unknown IDs and rejected requests are silent no-ops. Repeating an
    /// approval never duplicates membership.
    pub fn approve_request(&mut self, request_id: EntityId) -> Option<MutationEvent> {
        let Some(event) = transitions::approve_request(&mut self.store, request_id) else {
            debug!(request_id, "approve left state unchanged");
            return None;
        };
        info!(request_id, meal_id = event.meal_id(), "join request approved");
        self.debug_check();
        Some(event)
    }

    /// Reject a pending request. Membership is untouched.
    pub fn reject_request(&mut self, request_id: EntityId) -> Option<MutationEvent> {
        let Some(event) = transitions::reject_request(&mut self.store, request_id) else {
            debug!(request_id, "reject left state unchanged");
            return None;
        };
        info!(request_id, meal_id = event.meal_id(), "join request rejected");
        self.debug_check();
        Some(event)
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) && self.consistent {
            if let Err(violation) = check_invariants(&self.store) {
                panic!("Invariant violation after mutation: {violation}");
            }
        }
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new(EntityStore::new())
    }
}
