use chrono::{Duration, Utc};
use fadebook_core::store::{HoldStore, StoreError};
use fadebook_core::{AppointmentHold, SlotRange};
use fadebook_store::app_config::DatabaseConfig;
use fadebook_store::{DbClient, PgHoldStore};

// Needs a disposable Postgres: DATABASE_URL=postgres://... cargo test -- --ignored
#[tokio::test]
#[ignore]
async fn test_pg_store_conflict_and_sweep() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = DbClient::new(&DatabaseConfig {
        url,
        max_connections: 2,
        acquire_timeout_seconds: 3,
    })
    .await
    .unwrap();
    db.migrate().await.unwrap();
    let store = PgHoldStore::new(db.pool.clone());

    let barber = format!("barber-{}", uuid::Uuid::new_v4());
    let now = Utc::now();
    let slot = SlotRange::new(now + Duration::hours(2), now + Duration::hours(2) + Duration::minutes(30)).unwrap();

    let first = AppointmentHold::new(barber.clone(), slot, now, Duration::minutes(1)).unwrap();
    store.insert_exclusive(&first, now).await.unwrap();

    let clash = AppointmentHold::new(barber.clone(), slot, now, Duration::minutes(1)).unwrap();
    match store.insert_exclusive(&clash, now).await {
        Err(StoreError::Conflict(id)) => assert_eq!(id, first.id),
        other => panic!("expected conflict, got {:?}", other),
    }

    let found = store.find_active_overlapping(&barber, &slot, now).await.unwrap();
    assert_eq!(found.len(), 1);

    let later = now + Duration::minutes(2);
    assert!(store.find_active_overlapping(&barber, &slot, later).await.unwrap().is_empty());
    assert!(store.delete_expired(later).await.unwrap() >= 1);
    assert!(store.get(first.id).await.unwrap().is_none());
    assert!(store.delete(first.id).await.unwrap().is_none());
}
