use chrono::Utc;
use despacho_domain::entities::{EntryStatus, NewHub, NewQueueEntry};
use despacho_domain::repositories::{HubRepository, QueueRepository};
use despacho_domain::value_objects::Coordinates;
use despacho_infrastructure::{connect_embedded, SqliteHubRepository, SqliteQueueRepository};
use sqlx::SqlitePool;
use tempfile::TempDir;

struct TestDb {
    pool: SqlitePool,
    // Held so the database file outlives the pool.
    _dir: TempDir,
}

async fn test_db() -> TestDb {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!(
        "sqlite://{}",
        dir.path().join("despacho-test.db").to_string_lossy()
    );
    let pool = connect_embedded(&url, 5).await.expect("connect embedded db");
    TestDb { pool, _dir: dir }
}

async fn seed_hub(pool: &SqlitePool) -> i64 {
    let hubs = SqliteHubRepository::new(pool.clone());
    let hub = hubs
        .create(&NewHub {
            name: "Central Norte".to_string(),
            address: "Rua A, 1".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            radius_meters: 900.0,
            active: true,
        })
        .await
        .expect("create hub");
    hub.id
}

fn new_entry(hub_id: i64, professional_id: &str) -> NewQueueEntry {
    NewQueueEntry {
        hub_id,
        professional_id: professional_id.to_string(),
        display_name: professional_id.to_uppercase(),
        checkin: Coordinates::new(-23.5505, -46.6333).unwrap(),
        entered_at: Utc::now(),
    }
}

async fn waiting_positions(repo: &SqliteQueueRepository, hub_id: i64) -> Vec<(String, i32)> {
    repo.list_waiting(hub_id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.professional_id, e.position.unwrap()))
        .collect()
}

fn assert_contiguous(positions: &[(String, i32)]) {
    let mut values: Vec<i32> = positions.iter().map(|(_, p)| *p).collect();
    values.sort_unstable();
    let expected: Vec<i32> = (1..=positions.len() as i32).collect();
    assert_eq!(values, expected, "positions must be exactly 1..=N");
}

#[tokio::test]
async fn test_insert_tail_assigns_sequential_positions() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3)
        ]
    );
}

#[tokio::test]
async fn test_mark_en_route_closes_the_gap() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let b = repo.find_by_professional("b").await.unwrap().unwrap();

    let dispatched = repo.mark_en_route(b.id, false, Utc::now()).await.unwrap();
    assert_eq!(dispatched.status, EntryStatus::EnRoute);
    assert_eq!(dispatched.position, None);
    assert!(dispatched.dispatched_at.is_some());

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![("a".to_string(), 1), ("c".to_string(), 2)]
    );
    assert_contiguous(&positions);
}

#[tokio::test]
async fn test_mark_en_route_records_original_position_for_single_ride() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let b = repo.find_by_professional("b").await.unwrap().unwrap();

    let dispatched = repo.mark_en_route(b.id, true, Utc::now()).await.unwrap();
    assert!(dispatched.single_ride);
    assert_eq!(dispatched.original_position, Some(2));
}

#[tokio::test]
async fn test_mark_en_route_twice_fails_not_in_queue() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    let entry = repo.insert_tail(&new_entry(hub_id, "a")).await.unwrap();
    repo.mark_en_route(entry.id, false, Utc::now()).await.unwrap();

    let err = repo.mark_en_route(entry.id, false, Utc::now()).await.unwrap_err();
    assert_eq!(err.kind(), "NOT_IN_QUEUE");
}

#[tokio::test]
async fn test_reinsert_tail_lands_at_the_back() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let a = repo.find_by_professional("a").await.unwrap().unwrap();
    repo.mark_en_route(a.id, false, Utc::now()).await.unwrap();

    let returned = repo
        .reinsert_tail(a.id, Coordinates::new(-23.55, -46.63).unwrap(), Utc::now())
        .await
        .unwrap();
    assert_eq!(returned.status, EntryStatus::Waiting);
    assert_eq!(returned.position, Some(3));
    assert!(returned.returned_at.is_some());
    assert!(!returned.single_ride);
    assert_eq!(returned.original_position, None);

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("a".to_string(), 3)
        ]
    );
}

#[tokio::test]
async fn test_reinsert_at_shifts_slots_at_and_after_target() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    // a(1) b(2) c(3); dispatch b single-ride, then reinsert at 2.
    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let b = repo.find_by_professional("b").await.unwrap().unwrap();
    repo.mark_en_route(b.id, true, Utc::now()).await.unwrap();

    let returned = repo
        .reinsert_at(b.id, 2, Coordinates::new(-23.55, -46.63).unwrap(), Utc::now())
        .await
        .unwrap();
    assert_eq!(returned.position, Some(2));

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3)
        ]
    );
}

#[tokio::test]
async fn test_move_to_back_reorders_and_tags_reason() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let a = repo.find_by_professional("a").await.unwrap().unwrap();

    let moved = repo.move_to_back(a.id).await.unwrap();
    assert_eq!(moved.position, Some(3));
    assert_eq!(
        moved.position_reason.as_deref(),
        Some("movido_ultimo")
    );

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("a".to_string(), 3)
        ]
    );
}

#[tokio::test]
async fn test_move_to_back_when_already_last_is_noop() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let b = repo.find_by_professional("b").await.unwrap().unwrap();

    let moved = repo.move_to_back(b.id).await.unwrap();
    assert_eq!(moved.position, Some(2));
    assert_eq!(moved.position_reason, None);
}

#[tokio::test]
async fn test_delete_waiting_entry_closes_gap() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b", "c"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let a = repo.find_by_professional("a").await.unwrap().unwrap();

    repo.delete_entry(a.id).await.unwrap();

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(
        positions,
        vec![("b".to_string(), 1), ("c".to_string(), 2)]
    );
    assert!(repo.find_by_professional("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_en_route_entry_leaves_waiting_untouched() {
    let db = test_db().await;
    let hub_id = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    for professional in ["a", "b"] {
        repo.insert_tail(&new_entry(hub_id, professional)).await.unwrap();
    }
    let a = repo.find_by_professional("a").await.unwrap().unwrap();
    repo.mark_en_route(a.id, false, Utc::now()).await.unwrap();

    repo.delete_entry(a.id).await.unwrap();

    let positions = waiting_positions(&repo, hub_id).await;
    assert_eq!(positions, vec![("b".to_string(), 1)]);
}

#[tokio::test]
async fn test_queues_of_different_hubs_are_independent() {
    let db = test_db().await;
    let hub_a = seed_hub(&db.pool).await;
    let hub_b = seed_hub(&db.pool).await;
    let repo = SqliteQueueRepository::new(db.pool.clone());

    repo.insert_tail(&new_entry(hub_a, "a1")).await.unwrap();
    repo.insert_tail(&new_entry(hub_b, "b1")).await.unwrap();
    repo.insert_tail(&new_entry(hub_b, "b2")).await.unwrap();

    let a1 = repo.find_by_professional("a1").await.unwrap().unwrap();
    repo.delete_entry(a1.id).await.unwrap();

    let positions = waiting_positions(&repo, hub_b).await;
    assert_eq!(
        positions,
        vec![("b1".to_string(), 1), ("b2".to_string(), 2)]
    );
    assert_eq!(repo.count_by_hub(hub_a).await.unwrap(), 0);
    assert_eq!(repo.count_by_hub(hub_b).await.unwrap(), 2);
}
