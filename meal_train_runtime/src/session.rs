//! Session: the workflow engine plus persistence and the acting user.
//!
//! Apply-then-persist order for every mutation:
//!   1. engine applies the change (may return a workflow error, store untouched)
//!   2. gateway saves both collections
//!   3. observers re-derive their views
//!
//! If step 2 fails, the engine's store is rolled back to its contents from
//! before step 1 and observers are not notified.

use tracing::info;

use meal_train_kernel::{
    EntityId, EntityStore, JoinRequest, JoinStatus, MealTrain, MutationEvent, MutationObserver,
    WorkflowEngine, WorkflowError,
};

use crate::blob_store::BlobStore;
use crate::error::{Result, SessionError};
use crate::gateway::PersistenceGateway;

/// One meal train as seen by a non-creator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AvailableMeal<'a> {
    #[serde(flatten)]
    pub meal: &'a MealTrain,
    pub join_status: JoinStatus,
}

pub struct Session<S> {
    engine: WorkflowEngine,
    gateway: PersistenceGateway<S>,
    current_user: Option<String>,
    observers: Vec<Box<dyn MutationObserver>>,
}

impl<S: BlobStore> Session<S> {
    /// Load persisted state and the remembered login.
    ///
    /// Invariant violations in loaded data are logged by the engine, not
    /// repaired.
    pub fn open(blobs: S) -> Self {
        let gateway = PersistenceGateway::new(blobs);
        let (meals, requests) = gateway.load();
        let store = EntityStore::from_parts(meals, requests);
        info!(
            meals = store.meals().len(),
            requests = store.requests().len(),
            "session opened"
        );
        let current_user = gateway.load_current_user();
        Self::with_engine(WorkflowEngine::new(store), gateway, current_user)
    }

    /// Assemble a session around an existing engine, e.g. one with pinned
    /// identifiers or clock.
    pub fn with_engine(
        engine: WorkflowEngine,
        gateway: PersistenceGateway<S>,
        current_user: Option<String>,
    ) -> Self {
        Self {
            engine,
            gateway,
            current_user,
            observers: Vec::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        self.engine.store()
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn subscribe(&mut self, observer: impl MutationObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ── Identity ───────────────────────────────────────────────────

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn login(&mut self, username: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(WorkflowError::Validation { field: "username" }.into());
        }
        self.gateway.save_current_user(Some(username))?;
        info!(user = username, "logged in");
        self.current_user = Some(username.to_string());
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.gateway.save_current_user(None)?;
        if let Some(user) = self.current_user.take() {
            info!(user = %user, "logged out");
        }
        Ok(())
    }

    /// Act as `username` for this session only, without persisting it.
    /// A blank name leaves the current user in place.
    pub fn act_as(&mut self, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            tracing::warn!("ignoring blank user override");
            return;
        }
        self.current_user = Some(username.to_string());
    }

    fn actor(&self) -> Result<String> {
        self.current_user
            .clone()
            .filter(|user| !user.is_empty())
            .ok_or(SessionError::NotLoggedIn)
    }

    // ── Mutations ──────────────────────────────────────────────────

    pub fn create_meal_train(&mut self, name: &str, ingredients_text: &str) -> Result<MutationEvent> {
        let creator = self.actor()?;
        let before = self.engine.store().clone();
        let event = self
            .engine
            .create_meal_train(name, ingredients_text, &creator)?;
        self.persist(before, &event)?;
        Ok(event)
    }

    pub fn request_to_join(&mut self, meal_id: EntityId) -> Result<MutationEvent> {
        let user = self.actor()?;
        let before = self.engine.store().clone();
        let event = self.engine.request_to_join(meal_id, &user)?;
        self.persist(before, &event)?;
        Ok(event)
    }

    /// Approve as the logged-in user, who must have created the meal.
    /// `None` when nothing changed.
    pub fn approve_request(&mut self, request_id: EntityId) -> Result<Option<MutationEvent>> {
        self.authorize_creator(request_id)?;
        let before = self.engine.store().clone();
        let Some(event) = self.engine.approve_request(request_id) else {
            return Ok(None);
        };
        self.persist(before, &event)?;
        Ok(Some(event))
    }

    /// Reject as the logged-in user, who must have created the meal.
    /// `None` when nothing changed.
    pub fn reject_request(&mut self, request_id: EntityId) -> Result<Option<MutationEvent>> {
        self.authorize_creator(request_id)?;
        let before = self.engine.store().clone();
        let Some(event) = self.engine.reject_request(request_id) else {
            return Ok(None);
        };
        self.persist(before, &event)?;
        Ok(Some(event))
    }

    /// Unknown request IDs pass, so the engine can treat them as no-ops.
    fn authorize_creator(&self, request_id: EntityId) -> Result<()> {
        let user = self.actor()?;
        let store = self.engine.store();
        let Some(request) = store.request(request_id) else {
            return Ok(());
        };
        let owns_meal = store
            .meal(request.meal_id)
            .is_some_and(|meal| meal.creator == user);
        if owns_meal {
            Ok(())
        } else {
            Err(WorkflowError::InvalidOperation {
                reason: "only the creator of a meal train can decide on its requests".to_string(),
            }
            .into())
        }
    }

    /// Save the engine's current store, or restore `before` if that fails.
    fn persist(&mut self, before: EntityStore, event: &MutationEvent) -> Result<()> {
        let store = self.engine.store();
        if let Err(e) = self.gateway.save(store.meals(), store.requests()) {
            tracing::error!("rolling back unsaved mutation: {e}");
            self.engine.replace_store(before);
            return Err(e.into());
        }

        let store = self.engine.store();
        for observer in &mut self.observers {
            observer.on_mutation(event, store);
        }
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────────

    /// Meals created by others, with the current user's join status.
    pub fn available_meals(&self) -> Result<Vec<AvailableMeal<'_>>> {
        let user = self.actor()?;
        let store = self.engine.store();
        Ok(store
            .meals_excluding_creator(&user)
            .into_iter()
            .map(|meal| AvailableMeal {
                meal,
                join_status: store
                    .join_status(meal.id, &user)
                    .unwrap_or(JoinStatus::Available),
            })
            .collect())
    }

    pub fn own_meals(&self) -> Result<Vec<&MealTrain>> {
        let user = self.actor()?;
        Ok(self.engine.store().meals_by_creator(&user))
    }

    pub fn pending_requests(&self) -> Result<Vec<&JoinRequest>> {
        let user = self.actor()?;
        Ok(self.engine.store().pending_requests_for_creator(&user))
    }
}
