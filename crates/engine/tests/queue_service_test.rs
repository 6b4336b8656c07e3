mod common;

use common::{admin, professional, World, FAR_LAT, HUB_LAT, HUB_LON};
use despacho_domain::entities::{EntryStatus, HistoryAction, NotificationKind};
use despacho_domain::events::QueueEvent;
use despacho_domain::repositories::NotificationRepository;
use despacho_engine::EnterOutcome;
use despacho_errors::DispatchError;

#[tokio::test]
async fn test_enter_assigns_sequential_positions() {
    let world = World::new();
    let hub = world.seed_hub().await;

    for (index, id) in ["a", "b", "c"].iter().enumerate() {
        world.bind(id, hub.id).await;
        let outcome = world
            .queue_service
            .enter(&professional(id), HUB_LAT, HUB_LON)
            .await
            .unwrap();
        match outcome {
            EnterOutcome::Entered { entry } => {
                assert_eq!(entry.position, Some(index as i32 + 1));
                assert_eq!(entry.status, EntryStatus::Waiting);
            }
            other => panic!("expected Entered, got {other:?}"),
        }
    }

    assert_eq!(
        world.history.actions(),
        vec![
            HistoryAction::Entrance,
            HistoryAction::Entrance,
            HistoryAction::Entrance
        ]
    );
}

#[tokio::test]
async fn test_enter_without_binding_fails_not_bound() {
    let world = World::new();
    world.seed_hub().await;

    let err = world
        .queue_service
        .enter(&professional("ghost"), HUB_LAT, HUB_LON)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_BOUND");
    assert_eq!(world.queue.entry_count(), 0);
}

#[tokio::test]
async fn test_enter_on_inactive_hub_fails_not_bound() {
    let world = World::new();
    let mut hub = world.seed_hub().await;
    hub.active = false;
    use despacho_domain::repositories::HubRepository;
    world.hubs.update(&hub).await.unwrap();
    world.bind("a", hub.id).await;

    let err = world
        .queue_service
        .enter(&professional("a"), HUB_LAT, HUB_LON)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_BOUND");
}

#[tokio::test]
async fn test_enter_outside_radius_fails_with_measured_distance() {
    // Scenario A: radius 900 m, check-in ~1000 m away.
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind("a", hub.id).await;

    let err = world
        .queue_service
        .enter(&professional("a"), FAR_LAT, HUB_LON)
        .await
        .unwrap_err();

    match err {
        DispatchError::DistanceExceeded {
            distance_meters,
            allowed_radius_meters,
        } => {
            assert!((distance_meters - 1000.0).abs() < 10.0, "got {distance_meters}");
            assert_eq!(allowed_radius_meters, 900.0);
        }
        other => panic!("expected DistanceExceeded, got {other:?}"),
    }
    // Rejected check-ins never create or mutate entries.
    assert_eq!(world.queue.entry_count(), 0);
    assert!(world.history.recorded().is_empty());
}

#[tokio::test]
async fn test_enter_with_malformed_coordinates_fails_validation() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind("a", hub.id).await;

    let err = world
        .queue_service
        .enter(&professional("a"), 120.0, HUB_LON)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION");
}

#[tokio::test]
async fn test_double_enter_fails_already_in_queue() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    let err = world
        .queue_service
        .enter(&professional("a"), HUB_LAT, HUB_LON)
        .await
        .unwrap_err();
    match err {
        DispatchError::AlreadyInQueue { position, .. } => assert_eq!(position, 1),
        other => panic!("expected AlreadyInQueue, got {other:?}"),
    }
    assert_eq!(world.queue.entry_count(), 1);
}

#[tokio::test]
async fn test_dispatch_closes_the_gap() {
    // Scenario B: A(1) B(2) C(3); Dispatch(B) → {A:1, C:2}, B en route.
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }

    let dispatched = world
        .queue_service
        .dispatch(&admin(), hub.id, "b")
        .await
        .unwrap();
    assert_eq!(dispatched.status, EntryStatus::EnRoute);
    assert_eq!(dispatched.position, None);
    assert!(!dispatched.single_ride);

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![("a".to_string(), 1), ("c".to_string(), 2)]
    );

    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::Dispatched);
    assert_eq!(last.admin_id.as_deref(), Some("admin-1"));
    assert!(last.wait_minutes.is_some());

    let pending = world.notifications.find_pending("b").await.unwrap().unwrap();
    assert_eq!(pending.kind, NotificationKind::RouteDispatched);
    assert_eq!(pending.payload.hub_id, hub.id);
}

#[tokio::test]
async fn test_dispatch_requires_admin_role() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    let err = world
        .queue_service
        .dispatch(&professional("a"), hub.id, "a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "PERMISSION_DENIED");
    // Nothing changed.
    assert_eq!(world.waiting_names(hub.id).await, vec![("a".to_string(), 1)]);
}

#[tokio::test]
async fn test_dispatch_unknown_professional_fails_not_in_queue() {
    let world = World::new();
    let hub = world.seed_hub().await;

    let err = world
        .queue_service
        .dispatch(&admin(), hub.id, "nobody")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_dispatch_twice_fails_not_in_queue() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();
    let err = world
        .queue_service
        .dispatch(&admin(), hub.id, "a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_dispatch_against_wrong_hub_fails_not_in_queue() {
    let world = World::new();
    let hub = world.seed_hub().await;
    let other_hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    let err = world
        .queue_service
        .dispatch(&admin(), other_hub.id, "a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_plain_return_lands_at_the_tail() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }
    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();

    let outcome = world
        .queue_service
        .enter(&professional("a"), HUB_LAT, HUB_LON)
        .await
        .unwrap();
    match outcome {
        EnterOutcome::Returned { entry, priority } => {
            assert!(!priority);
            assert_eq!(entry.position, Some(3));
            assert!(entry.returned_at.is_some());
        }
        other => panic!("expected Returned, got {other:?}"),
    }

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("a".to_string(), 3)
        ]
    );
    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::Return);
    assert!(last.en_route_minutes.is_some());
}

#[tokio::test]
async fn test_priority_return_reclaims_original_slot() {
    // Scenario C: DispatchPriority(B) with original_position=2, then Return.
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }

    let dispatched = world
        .queue_service
        .dispatch_priority(&admin(), hub.id, "b")
        .await
        .unwrap();
    assert!(dispatched.single_ride);
    assert_eq!(dispatched.original_position, Some(2));

    let pending = world.notifications.find_pending("b").await.unwrap().unwrap();
    assert_eq!(pending.kind, NotificationKind::SingleRide);
    assert!(pending.payload.single_ride);
    assert_eq!(pending.payload.original_position, Some(2));

    let outcome = world
        .queue_service
        .enter(&professional("b"), HUB_LAT, HUB_LON)
        .await
        .unwrap();
    match outcome {
        EnterOutcome::Returned { entry, priority } => {
            assert!(priority);
            assert_eq!(entry.position, Some(2));
            assert!(!entry.single_ride);
            assert_eq!(entry.original_position, None);
        }
        other => panic!("expected Returned, got {other:?}"),
    }

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3)
        ]
    );
    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::PriorityReturn);
    assert_eq!(last.note.as_deref(), Some("posição original 2"));
}

#[tokio::test]
async fn test_priority_return_clamps_when_queue_shrank() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c", "d"] {
        world.bind_and_enter(id, hub.id).await;
    }

    // D leaves from position 4; A and B then leave the queue entirely.
    world
        .queue_service
        .dispatch_priority(&admin(), hub.id, "d")
        .await
        .unwrap();
    world
        .queue_service
        .remove(&admin(), hub.id, "a", None)
        .await
        .unwrap();
    world
        .queue_service
        .remove(&admin(), hub.id, "b", None)
        .await
        .unwrap();
    assert_eq!(world.waiting_names(hub.id).await, vec![("c".to_string(), 1)]);

    // Original slot 4 no longer exists; D lands right after C.
    let outcome = world
        .queue_service
        .enter(&professional("d"), HUB_LAT, HUB_LON)
        .await
        .unwrap();
    assert_eq!(outcome.entry().position, Some(2));

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![("c".to_string(), 1), ("d".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_priority_return_into_empty_queue_lands_first() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b"] {
        world.bind_and_enter(id, hub.id).await;
    }

    world
        .queue_service
        .dispatch_priority(&admin(), hub.id, "b")
        .await
        .unwrap();
    world
        .queue_service
        .remove(&admin(), hub.id, "a", None)
        .await
        .unwrap();

    let outcome = world
        .queue_service
        .enter(&professional("b"), HUB_LAT, HUB_LON)
        .await
        .unwrap();
    assert_eq!(outcome.entry().position, Some(1));
    assert_eq!(world.waiting_names(hub.id).await, vec![("b".to_string(), 1)]);
}

#[tokio::test]
async fn test_priority_return_from_head_shifts_everyone() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }

    world
        .queue_service
        .dispatch_priority(&admin(), hub.id, "a")
        .await
        .unwrap();
    let outcome = world
        .queue_service
        .enter(&professional("a"), HUB_LAT, HUB_LON)
        .await
        .unwrap();
    assert_eq!(outcome.entry().position, Some(1));

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3)
        ]
    );
}

#[tokio::test]
async fn test_move_to_back_demotes_and_records() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }

    let moved = world
        .queue_service
        .move_to_back(&admin(), hub.id, "a")
        .await
        .unwrap();
    assert_eq!(moved.position, Some(3));
    assert_eq!(moved.position_reason.as_deref(), Some("movido_ultimo"));

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("a".to_string(), 3)
        ]
    );
    assert_eq!(
        world.history.recorded().pop().unwrap().action,
        HistoryAction::MovedToBack
    );
}

#[tokio::test]
async fn test_move_to_back_when_already_last_is_noop() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b"] {
        world.bind_and_enter(id, hub.id).await;
    }
    let history_before = world.history.recorded().len();

    let moved = world
        .queue_service
        .move_to_back(&admin(), hub.id, "b")
        .await
        .unwrap();
    assert_eq!(moved.position, Some(2));
    // No ledger entry for a no-op.
    assert_eq!(world.history.recorded().len(), history_before);
}

#[tokio::test]
async fn test_remove_closes_the_gap() {
    // Scenario D: Remove(A) from {A:1, B:2, C:3} → {B:1, C:2}.
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }

    world
        .queue_service
        .remove(&admin(), hub.id, "a", Some("não respondeu ao chamado".to_string()))
        .await
        .unwrap();

    assert_eq!(
        world.waiting_names(hub.id).await,
        vec![("b".to_string(), 1), ("c".to_string(), 2)]
    );
    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::Removed);
    assert_eq!(last.note.as_deref(), Some("não respondeu ao chamado"));
    assert!(last.wait_minutes.is_some());
}

#[tokio::test]
async fn test_remove_en_route_entry_records_route_time() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;
    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();

    world
        .queue_service
        .remove(&admin(), hub.id, "a", None)
        .await
        .unwrap();

    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::Removed);
    assert!(last.wait_minutes.is_none());
    assert!(last.en_route_minutes.is_some());
    assert_eq!(world.queue.entry_count(), 0);
}

#[tokio::test]
async fn test_exit_is_voluntary_removal() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b"] {
        world.bind_and_enter(id, hub.id).await;
    }

    world.queue_service.exit(&professional("a")).await.unwrap();

    assert_eq!(world.waiting_names(hub.id).await, vec![("b".to_string(), 1)]);
    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.action, HistoryAction::VoluntaryExit);
    assert_eq!(last.admin_id, None);
}

#[tokio::test]
async fn test_exit_when_absent_fails_not_in_queue() {
    let world = World::new();
    world.seed_hub().await;

    let err = world.queue_service.exit(&professional("a")).await.unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_my_position_lists_nearby_neighbors() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c", "d", "e"] {
        world.bind_and_enter(id, hub.id).await;
    }

    let view = world
        .queue_service
        .my_position(&professional("c"))
        .await
        .unwrap();
    assert_eq!(view.entry.position, Some(3));
    assert_eq!(view.total_waiting, 5);
    assert_eq!(
        view.ahead.iter().map(|n| n.position).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(
        view.behind.iter().map(|n| n.position).collect::<Vec<_>>(),
        vec![4, 5]
    );
    assert!(view.en_route_minutes.is_none());
}

#[tokio::test]
async fn test_my_position_when_absent_fails_not_in_queue() {
    let world = World::new();
    world.seed_hub().await;

    let err = world
        .queue_service
        .my_position(&professional("a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_which_hub_reports_binding_and_entry() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    let status = world
        .queue_service
        .which_hub(&professional("a"))
        .await
        .unwrap();
    assert_eq!(status.binding.unwrap().hub_id, hub.id);
    assert_eq!(status.hub.unwrap().id, hub.id);
    assert_eq!(status.entry.unwrap().position, Some(1));

    let unbound = world
        .queue_service
        .which_hub(&professional("ghost"))
        .await
        .unwrap();
    assert!(unbound.binding.is_none());
    assert!(unbound.hub.is_none());
    assert!(unbound.entry.is_none());
}

#[tokio::test]
async fn test_list_queue_flags_overdue_routes() {
    let world = World::new();
    let hub = world.seed_hub().await;
    for id in ["a", "b", "c"] {
        world.bind_and_enter(id, hub.id).await;
    }
    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();
    world.queue_service.dispatch(&admin(), hub.id, "b").await.unwrap();
    // A has been on the road for ~2 hours, B just left.
    world.queue.backdate_dispatch("a", 120);

    let view = world
        .queue_service
        .list_queue(&admin(), hub.id)
        .await
        .unwrap();
    assert_eq!(view.waiting.len(), 1);
    assert_eq!(view.en_route.len(), 2);
    assert_eq!(view.alerts.len(), 1);
    assert_eq!(view.alerts[0].professional_id, "a");
    assert!(view.alerts[0].minutes_en_route >= 120);
}

#[tokio::test]
async fn test_history_failure_never_blocks_the_mutation() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;

    world.history.fail_appends(true);
    let dispatched = world
        .queue_service
        .dispatch(&admin(), hub.id, "a")
        .await
        .unwrap();
    assert_eq!(dispatched.status, EntryStatus::EnRoute);
    // The ledger write was lost, not the transition.
    assert!(world
        .history
        .actions()
        .iter()
        .all(|a| *a != HistoryAction::Dispatched));
}

#[tokio::test]
async fn test_queue_events_are_published() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;
    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();

    let events = world.events.published();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], QueueEvent::ProfessionalEntered { .. }));
    assert!(matches!(
        events[1],
        QueueEvent::ProfessionalDispatched { single_ride: false, .. }
    ));
}

#[tokio::test]
async fn test_dispatch_wait_minutes_counts_from_last_waiting_transition() {
    let world = World::new();
    let hub = world.seed_hub().await;
    world.bind_and_enter("a", hub.id).await;
    world.queue.backdate_entry("a", 45);

    world.queue_service.dispatch(&admin(), hub.id, "a").await.unwrap();

    let last = world.history.recorded().pop().unwrap();
    assert_eq!(last.wait_minutes, Some(45));
}
