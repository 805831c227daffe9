use chrono::DateTime;
use std::{path::PathBuf, sync::Arc};
use uuid::Uuid;

use room_booking::{
    models::{Reservation, Room, Timestamp},
    store::{ReservationStore, SqliteReservationStore, StoreError},
};

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("room_booking_test_{}.db", Uuid::new_v4()));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

async fn open_store(db: &TempDb) -> SqliteReservationStore {
    let store = SqliteReservationStore::connect(&db.url()).await.unwrap();
    store.migrate().await.unwrap();
    store
}

fn at(s: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn reservation(room: Room, start: &str, end: &str) -> Reservation {
    Reservation {
        id: String::new(),
        start: at(start),
        end: at(end),
        room,
        title: "standup".into(),
        description: None,
        owner_id: "alice".into(),
        is_private: false,
    }
}

#[tokio::test]
async fn create_get_preserves_offsets_and_description() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    let mut r = reservation(Room::R21, "2099-01-05T10:00:00+03:00", "2099-01-05T11:30:00+03:00");
    r.description = Some(String::new());
    r.is_private = true;

    let created = store.create(r.clone()).await.unwrap();
    assert!(!created.id.is_empty());

    let fetched = store.get(&created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.start.offset().local_minus_utc(), 3 * 3600);
    assert_eq!(fetched.description.as_deref(), Some(""));
    assert!(fetched.is_private);
    assert_eq!(fetched.room, Room::R21);
}

#[tokio::test]
async fn list_is_ordered_by_start() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    store
        .create(reservation(Room::R132, "2099-01-05T14:00:00Z", "2099-01-05T15:00:00Z"))
        .await
        .unwrap();
    // Earlier instant despite the later-looking wall clock.
    store
        .create(reservation(Room::R256, "2099-01-05T15:00:00+03:00", "2099-01-05T16:00:00+03:00"))
        .await
        .unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].room, Room::R256);
    assert_eq!(listed[1].room, Room::R132);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    assert!(matches!(store.get("nope").await, Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete("nope").await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_row() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    let created = store
        .create(reservation(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00Z"))
        .await
        .unwrap();
    store.delete(&created.id).await.unwrap();
    assert!(matches!(store.get(&created.id).await, Err(StoreError::NotFound(_))));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn trigger_rejects_same_room_overlap() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    store
        .create(reservation(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T12:00:00Z"))
        .await
        .unwrap();

    // Same instants expressed in another offset.
    let clash = reservation(Room::R21, "2099-01-05T14:00:00+03:00", "2099-01-05T14:30:00+03:00");
    assert!(matches!(store.create(clash).await, Err(StoreError::Overlap)));

    // Touching spans and other rooms are fine.
    store
        .create(reservation(Room::R21, "2099-01-05T12:00:00Z", "2099-01-05T13:00:00Z"))
        .await
        .unwrap();
    store
        .create(reservation(Room::R132, "2099-01-05T10:00:00Z", "2099-01-05T12:00:00Z"))
        .await
        .unwrap();
}

#[tokio::test]
async fn sub_millisecond_overlap_is_rejected() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    store
        .create(reservation(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00.0009Z"))
        .await
        .unwrap();

    let clash = reservation(Room::R21, "2099-01-05T11:00:00.0001Z", "2099-01-05T12:00:00Z");
    assert!(clash.span().overlaps(&store.list().await.unwrap()[0].span()));
    assert!(matches!(store.create(clash).await, Err(StoreError::Overlap)));

    // Exactly adjacent at nanosecond precision is still allowed.
    let adjacent = store
        .create(reservation(Room::R21, "2099-01-05T11:00:00.0009Z", "2099-01-05T12:00:00Z"))
        .await
        .unwrap();
    let fetched = store.get(&adjacent.id).await.unwrap();
    assert_eq!(fetched.start, adjacent.start);
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn instants_outside_nanosecond_range_are_refused() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    let far = reservation(Room::R21, "2999-01-05T10:00:00Z", "2999-01-05T11:00:00Z");
    assert!(matches!(store.create(far).await, Err(StoreError::OutOfRange(_))));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_id_is_reported() {
    let db = TempDb::new();
    let store = open_store(&db).await;

    let mut r = reservation(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00Z");
    r.id = "fixed".into();
    store.create(r.clone()).await.unwrap();

    r.start = at("2099-01-06T10:00:00Z");
    r.end = at("2099-01-06T11:00:00Z");
    assert!(matches!(store.create(r).await, Err(StoreError::DuplicateId(id)) if id == "fixed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_creates_have_one_winner() {
    let db = TempDb::new();
    let store = Arc::new(open_store(&db).await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let start = format!("2099-01-05T10:{:02}:00Z", i);
                store
                    .create(reservation(Room::R256, &start, "2099-01-05T12:00:00Z"))
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let mut wins = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => wins += 1,
            Err(StoreError::Overlap) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn migrate_is_idempotent_and_keeps_rows() {
    let db = TempDb::new();
    let store = open_store(&db).await;
    store
        .create(reservation(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00Z"))
        .await
        .unwrap();

    store.migrate().await.unwrap();
    store.health_check().await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1);
}
