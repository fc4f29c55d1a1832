use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::hold::{AppointmentHold, SlotRange};
use crate::store::{HoldStore, StoreError, StoreResult};

/// In-memory hold store for tests and local runs
pub struct InMemoryHoldStore {
    holds: RwLock<HashMap<Uuid, AppointmentHold>>,
}

impl InMemoryHoldStore {
    pub fn new() -> Self {
        Self {
            holds: RwLock::new(HashMap::new()),
        }
    }

    /// Rows currently stored, expired or not
    pub async fn len(&self) -> usize {
        self.holds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.holds.read().await.is_empty()
    }
}

impl Default for InMemoryHoldStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HoldStore for InMemoryHoldStore {
    async fn insert_exclusive(&self, hold: &AppointmentHold, now: DateTime<Utc>) -> StoreResult<()> {
        let mut holds = self.holds.write().await;

        if let Some(existing) = holds
            .values()
            .find(|h| h.blocks(&hold.barber_id, &hold.slot, now))
        {
            return Err(StoreError::Conflict(existing.id));
        }

        holds.insert(hold.id, hold.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>> {
        Ok(self.holds.read().await.get(&id).cloned())
    }

    async fn find_active_overlapping(
        &self,
        barber_id: &str,
        slot: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>> {
        let holds = self.holds.read().await;
        Ok(holds
            .values()
            .filter(|h| h.blocks(barber_id, slot, now))
            .cloned()
            .collect())
    }

    async fn list_active_for_barber(
        &self,
        barber_id: &str,
        window: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>> {
        let mut found = self.find_active_overlapping(barber_id, window, now).await?;
        found.sort_by_key(|h| h.slot.start());
        Ok(found)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>> {
        Ok(self.holds.write().await.remove(&id))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut holds = self.holds.write().await;
        let initial_count = holds.len();

        holds.retain(|_, hold| hold.expires_at >= now);

        Ok((initial_count - holds.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap()
    }

    fn slot(start_min: i64, len_min: i64) -> SlotRange {
        let base = Utc.with_ymd_and_hms(2026, 5, 2, 14, 0, 0).unwrap();
        SlotRange::new(
            base + Duration::minutes(start_min),
            base + Duration::minutes(start_min + len_min),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_rejects_active_overlap() {
        let store = InMemoryHoldStore::new();
        let first = AppointmentHold::new("b1", slot(0, 30), t0(), Duration::minutes(10)).unwrap();
        store.insert_exclusive(&first, t0()).await.unwrap();

        let clash = AppointmentHold::new("b1", slot(15, 30), t0(), Duration::minutes(10)).unwrap();
        match store.insert_exclusive(&clash, t0()).await {
            Err(StoreError::Conflict(id)) => assert_eq!(id, first.id),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(store.len().await, 1);

        // once the first hold lapses the slot is free again, sweep or not
        let later = t0() + Duration::minutes(10);
        let retry = AppointmentHold::new("b1", slot(15, 30), later, Duration::minutes(10)).unwrap();
        store.insert_exclusive(&retry, later).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_boundary_row() {
        let store = InMemoryHoldStore::new();
        let hold = AppointmentHold::new("b1", slot(0, 30), t0(), Duration::minutes(5)).unwrap();
        store.insert_exclusive(&hold, t0()).await.unwrap();

        // expires_at == now: expired for reads but not yet past for the sweep
        assert_eq!(store.delete_expired(hold.expires_at).await.unwrap(), 0);
        assert_eq!(
            store.delete_expired(hold.expires_at + Duration::seconds(1)).await.unwrap(),
            1
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_active_sorted_by_slot() {
        let store = InMemoryHoldStore::new();
        let late = AppointmentHold::new("b1", slot(120, 30), t0(), Duration::minutes(10)).unwrap();
        let early = AppointmentHold::new("b1", slot(0, 30), t0(), Duration::minutes(10)).unwrap();
        let other_barber = AppointmentHold::new("b2", slot(60, 30), t0(), Duration::minutes(10)).unwrap();
        for h in [&late, &early, &other_barber] {
            store.insert_exclusive(h, t0()).await.unwrap();
        }

        let listed = store
            .list_active_for_barber("b1", &slot(0, 240), t0())
            .await
            .unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }
}
