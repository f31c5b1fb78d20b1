//! Workflow scenarios driven through the public engine API.
//!
//! Each test builds its own in-memory store; nothing is shared.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use meal_train_kernel::ids::{FixedClock, MonotonicIds};
use meal_train_kernel::invariants::check_invariants;
use meal_train_kernel::{
    EntityId, EntityStore, JoinRequest, MealTrain, MutationEvent, RequestStatus, WorkflowEngine,
    WorkflowError,
};

#[fixture]
fn engine() -> WorkflowEngine {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap());
    WorkflowEngine::with_services(
        EntityStore::new(),
        Box::new(MonotonicIds::default()),
        Box::new(clock),
    )
}

fn create_tacos(engine: &mut WorkflowEngine) -> EntityId {
    engine
        .create_meal_train("Tacos", "tortillas\nbeef\n\ncheese", "alice")
        .map(|event| event.meal_id())
        .unwrap()
}

fn join(engine: &mut WorkflowEngine, meal_id: EntityId, user: &str) -> EntityId {
    match engine.request_to_join(meal_id, user).unwrap() {
        MutationEvent::JoinRequested { request_id, .. } => request_id,
        other => panic!("unexpected event {other:?}"),
    }
}

fn status(engine: &WorkflowEngine, request_id: EntityId) -> RequestStatus {
    engine.store().request(request_id).unwrap().status
}

fn members(engine: &WorkflowEngine, meal_id: EntityId) -> Vec<String> {
    engine.store().meal(meal_id).unwrap().members.clone()
}

// ─────────────────────────────────────────────────────────────
// Creation
// ─────────────────────────────────────────────────────────────

#[rstest]
fn creating_tacos_drops_blank_ingredients(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let meal = engine.store().meal(meal_id).unwrap();

    assert_eq!(meal.name, "Tacos");
    assert_eq!(meal.ingredients, vec!["tortillas", "beef", "cheese"]);
    assert_eq!(meal.members, vec!["alice"]);
    assert_eq!(meal.creator, "alice");
    assert_eq!(meal.created_at, Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap());
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn blank_names_are_rejected_without_mutation(mut engine: WorkflowEngine, #[case] name: &str) {
    let err = engine.create_meal_train(name, "rice", "alice").unwrap_err();
    assert_eq!(err, WorkflowError::Validation { field: "name" });
    assert!(engine.store().meals().is_empty());
}

#[rstest]
fn empty_ingredient_list_is_allowed(mut engine: WorkflowEngine) {
    let event = engine.create_meal_train("  Potluck ", "\n \n", "alice").unwrap();
    let meal = engine.store().meal(event.meal_id()).unwrap();
    assert_eq!(meal.name, "Potluck");
    assert!(meal.ingredients.is_empty());
}

// ─────────────────────────────────────────────────────────────
// Join requests
// ─────────────────────────────────────────────────────────────

#[rstest]
fn join_request_starts_pending(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let request_id = join(&mut engine, meal_id, "bob");

    assert_eq!(status(&engine, request_id), RequestStatus::Pending);
    assert_eq!(members(&engine, meal_id), vec!["alice"]);
    assert_eq!(engine.store().requests().len(), 1);
}

#[rstest]
fn joining_a_missing_meal_is_not_found(mut engine: WorkflowEngine) {
    let err = engine.request_to_join(404, "bob").unwrap_err();
    assert_eq!(err, WorkflowError::NotFound { meal_id: 404 });
    assert!(engine.store().requests().is_empty());
}

#[rstest]
fn creator_cannot_request_own_meal(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let err = engine.request_to_join(meal_id, "alice").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidOperation { .. }));
    assert!(engine.store().requests().is_empty());
}

#[rstest]
#[case::while_pending(None)]
#[case::after_approval(Some(true))]
#[case::after_rejection(Some(false))]
fn second_request_for_same_pair_is_duplicate(
    mut engine: WorkflowEngine,
    #[case] resolve: Option<bool>,
) {
    let meal_id = create_tacos(&mut engine);
    let request_id = join(&mut engine, meal_id, "bob");
    match resolve {
        Some(true) => {
            engine.approve_request(request_id);
        }
        Some(false) => {
            engine.reject_request(request_id);
        }
        None => {}
    }

    let err = engine.request_to_join(meal_id, "bob").unwrap_err();
    assert_eq!(
        err,
        WorkflowError::DuplicateRequest {
            meal_id,
            username: "bob".to_string()
        }
    );
    let for_pair = engine
        .store()
        .requests()
        .iter()
        .filter(|r| r.meal_id == meal_id && r.username == "bob")
        .count();
    assert_eq!(for_pair, 1);
}

#[rstest]
fn not_found_is_checked_before_other_preconditions(mut engine: WorkflowEngine) {
    create_tacos(&mut engine);
    // "alice" would be InvalidOperation on an existing meal.
    let err = engine.request_to_join(999, "alice").unwrap_err();
    assert_eq!(err, WorkflowError::NotFound { meal_id: 999 });
}

// ─────────────────────────────────────────────────────────────
// Approval and rejection
// ─────────────────────────────────────────────────────────────

#[rstest]
fn approve_then_reject_scenario(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let bob = join(&mut engine, meal_id, "bob");
    let carol = join(&mut engine, meal_id, "carol");

    let event = engine.approve_request(bob);
    assert_eq!(
        event,
        Some(MutationEvent::RequestApproved {
            request_id: bob,
            meal_id,
            member_added: true
        })
    );
    assert_eq!(status(&engine, bob), RequestStatus::Approved);
    assert_eq!(members(&engine, meal_id), vec!["alice", "bob"]);

    let event = engine.reject_request(carol);
    assert_eq!(
        event,
        Some(MutationEvent::RequestRejected {
            request_id: carol,
            meal_id
        })
    );
    assert_eq!(status(&engine, carol), RequestStatus::Rejected);
    assert_eq!(members(&engine, meal_id), vec!["alice", "bob"]);
}

#[rstest]
fn approving_twice_matches_approving_once(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let bob = join(&mut engine, meal_id, "bob");

    assert!(engine.approve_request(bob).is_some());
    let once = members(&engine, meal_id);
    assert_eq!(engine.approve_request(bob), None);

    assert_eq!(members(&engine, meal_id), once);
    assert_eq!(status(&engine, bob), RequestStatus::Approved);
}

#[rstest]
fn terminal_states_do_not_change(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let bob = join(&mut engine, meal_id, "bob");
    let carol = join(&mut engine, meal_id, "carol");
    engine.approve_request(bob);
    engine.reject_request(carol);

    assert_eq!(engine.reject_request(bob), None);
    assert_eq!(engine.approve_request(carol), None);
    assert_eq!(status(&engine, bob), RequestStatus::Approved);
    assert_eq!(status(&engine, carol), RequestStatus::Rejected);
    assert_eq!(members(&engine, meal_id), vec!["alice", "bob"]);
}

#[rstest]
fn unknown_request_ids_are_silent_no_ops(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let before = engine.store().clone();

    assert_eq!(engine.approve_request(meal_id + 100), None);
    assert_eq!(engine.reject_request(meal_id + 100), None);
    assert_eq!(engine.store(), &before);
}

#[rstest]
fn pending_requests_follow_insertion_order(mut engine: WorkflowEngine) {
    let meal_id = create_tacos(&mut engine);
    let other = engine.create_meal_train("Soup", "", "bob").unwrap().meal_id();
    let dave = join(&mut engine, meal_id, "dave");
    join(&mut engine, other, "carol");
    let erin = join(&mut engine, meal_id, "erin");
    let frank = join(&mut engine, meal_id, "frank");
    engine.reject_request(erin);

    let pending: Vec<EntityId> = engine
        .store()
        .pending_requests_for_creator("alice")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(pending, vec![dave, frank]);
}

/// Tacos (id 1) by alice, with bob's request 2 already approved but bob
/// missing from the members.
fn approved_without_member() -> EntityStore {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
    EntityStore::from_parts(
        vec![MealTrain {
            id: 1,
            name: "Tacos".to_string(),
            ingredients: vec!["beef".to_string()],
            creator: "alice".to_string(),
            members: vec!["alice".to_string()],
            created_at: at,
        }],
        vec![JoinRequest {
            id: 2,
            meal_id: 1,
            username: "bob".to_string(),
            status: RequestStatus::Approved,
            created_at: at,
        }],
    )
}

#[test]
fn reapproval_repairs_missing_membership_once() {
    let mut engine = WorkflowEngine::new(approved_without_member());
    assert!(!engine.is_consistent());

    assert_eq!(
        engine.approve_request(2),
        Some(MutationEvent::RequestApproved {
            request_id: 2,
            meal_id: 1,
            member_added: true
        })
    );
    assert_eq!(members(&engine, 1), vec!["alice", "bob"]);
    assert_eq!(check_invariants(engine.store()), Ok(()));

    assert_eq!(engine.approve_request(2), None);
    assert_eq!(members(&engine, 1), vec!["alice", "bob"]);
}

#[rstest]
fn consistency_is_tracked_across_store_swaps(mut engine: WorkflowEngine) {
    assert!(engine.is_consistent());
    let sound = engine.replace_store(approved_without_member());
    assert!(!engine.is_consistent());
    engine.replace_store(sound);
    assert!(engine.is_consistent());
}

// ─────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────

#[test]
fn new_ids_never_collide_with_loaded_ones() {
    let mut seed = WorkflowEngine::default();
    let meal_id = seed.create_meal_train("Stew", "", "alice").unwrap().meal_id();
    join(&mut seed, meal_id, "bob");
    let loaded = seed.store().clone();
    let highest = loaded.max_id();

    let mut engine = WorkflowEngine::new(loaded);
    let fresh = engine.create_meal_train("Chili", "beans", "carol").unwrap().meal_id();
    assert!(fresh > highest);
    assert_eq!(check_invariants(engine.store()), Ok(()));
}

#[rstest]
fn invariants_hold_across_a_busy_session(mut engine: WorkflowEngine) {
    let tacos = create_tacos(&mut engine);
    let soup = engine.create_meal_train("Soup", "leeks", "bob").unwrap().meal_id();
    let r1 = join(&mut engine, tacos, "bob");
    let r2 = join(&mut engine, soup, "alice");
    let r3 = join(&mut engine, tacos, "carol");
    engine.approve_request(r1);
    engine.approve_request(r2);
    engine.reject_request(r3);
    engine.approve_request(r1);

    assert_eq!(check_invariants(engine.store()), Ok(()));
    for request in engine.store().requests() {
        let meal = engine.store().meal(request.meal_id).unwrap();
        assert!(meal.is_member(&meal.creator));
        if request.status == RequestStatus::Approved {
            assert!(meal.is_member(&request.username));
        }
    }
}
