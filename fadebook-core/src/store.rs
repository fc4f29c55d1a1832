use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::hold::{AppointmentHold, SlotRange};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("slot overlaps active hold {0}")]
    Conflict(Uuid),
    #[error("store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for the appointment hold relation
#[async_trait]
pub trait HoldStore: Send + Sync {
    /// Inserts `hold` unless an active hold for the same barber overlaps its
    /// slot at `now`. Check and insert are atomic with respect to other writers.
    async fn insert_exclusive(&self, hold: &AppointmentHold, now: DateTime<Utc>) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>>;

    async fn find_active_overlapping(
        &self,
        barber_id: &str,
        slot: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>>;

    /// Active holds for `barber_id` intersecting `window`, ordered by slot start.
    async fn list_active_for_barber(
        &self,
        barber_id: &str,
        window: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>>;

    async fn delete(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>>;

    /// Removes every row with `expires_at < now` in one statement.
    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
