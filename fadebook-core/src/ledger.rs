use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::hold::{AppointmentHold, HoldStatus, SlotRange};
use crate::store::{HoldStore, StoreError};
use crate::{LedgerError, LedgerResult};

/// TTL bounds applied at hold creation
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    pub default_ttl: Duration,
    pub max_ttl: Duration,
}

impl HoldPolicy {
    pub fn new(default_ttl: Duration, max_ttl: Duration) -> LedgerResult<Self> {
        if default_ttl <= Duration::zero() || max_ttl <= Duration::zero() {
            return Err(LedgerError::Validation(format!(
                "hold ttls must be positive, got default {}s and max {}s",
                default_ttl.num_seconds(),
                max_ttl.num_seconds()
            )));
        }
        if default_ttl > max_ttl {
            return Err(LedgerError::Validation(format!(
                "default ttl of {}s exceeds the {}s maximum",
                default_ttl.num_seconds(),
                max_ttl.num_seconds()
            )));
        }
        Ok(Self { default_ttl, max_ttl })
    }
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            default_ttl: Duration::minutes(10),
            max_ttl: Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub deleted_count: u64,
    pub swept_at: DateTime<Utc>,
}

/// Owns the existence window of appointment holds.
///
/// Every operation is a single round trip to the store. Nothing is retried
/// here; callers decide on backoff.
#[derive(Clone)]
pub struct HoldLedger {
    store: Arc<dyn HoldStore>,
    clock: Arc<dyn Clock>,
    policy: HoldPolicy,
}

impl HoldLedger {
    pub fn new(store: Arc<dyn HoldStore>, clock: Arc<dyn Clock>, policy: HoldPolicy) -> Self {
        Self { store, clock, policy }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Reserve `slot` for `barber_id` until `now + ttl`.
    pub async fn create_hold(
        &self,
        barber_id: &str,
        slot: SlotRange,
        ttl: Option<Duration>,
    ) -> LedgerResult<AppointmentHold> {
        let barber_id = normalize_barber_id(barber_id)?;

        let ttl = ttl.unwrap_or(self.policy.default_ttl);
        if ttl <= Duration::zero() {
            return Err(LedgerError::Validation(format!(
                "ttl must be positive, got {}s",
                ttl.num_seconds()
            )));
        }
        if ttl > self.policy.max_ttl {
            return Err(LedgerError::Validation(format!(
                "ttl of {}s exceeds the {}s maximum",
                ttl.num_seconds(),
                self.policy.max_ttl.num_seconds()
            )));
        }

        let now = self.clock.now();
        let hold = AppointmentHold::new(barber_id, slot, now, ttl)?;

        match self.store.insert_exclusive(&hold, now).await {
            Ok(()) => {
                info!(
                    "Hold {} created for barber {} ({} .. {}), expires {}",
                    hold.id,
                    hold.barber_id,
                    hold.slot.start(),
                    hold.slot.end(),
                    hold.expires_at
                );
                Ok(hold)
            }
            Err(StoreError::Conflict(existing)) => {
                warn!("Hold rejected for barber {}: slot held by {}", barber_id, existing);
                Err(LedgerError::Conflict {
                    barber_id: barber_id.to_string(),
                    existing,
                })
            }
            Err(e) => Err(LedgerError::Persistence(e)),
        }
    }

    /// Delete every hold whose `expires_at` is strictly before `now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> LedgerResult<u64> {
        let deleted = self
            .store
            .delete_expired(now)
            .await
            .map_err(LedgerError::Persistence)?;

        if deleted > 0 {
            info!("Swept {} expired holds at {}", deleted, now);
        }
        Ok(deleted)
    }

    pub async fn sweep_expired_now(&self) -> LedgerResult<SweepReport> {
        let swept_at = self.clock.now();
        let deleted_count = self.sweep_expired(swept_at).await?;
        Ok(SweepReport { deleted_count, swept_at })
    }

    pub async fn is_slot_held(
        &self,
        barber_id: &str,
        slot: &SlotRange,
        now: DateTime<Utc>,
    ) -> LedgerResult<bool> {
        let barber_id = normalize_barber_id(barber_id)?;
        let blocking = self
            .store
            .find_active_overlapping(barber_id, slot, now)
            .await
            .map_err(LedgerError::Persistence)?;
        Ok(!blocking.is_empty())
    }

    pub async fn get_hold(&self, id: Uuid) -> LedgerResult<(AppointmentHold, HoldStatus)> {
        let hold = self
            .store
            .get(id)
            .await
            .map_err(LedgerError::Persistence)?
            .ok_or(LedgerError::NotFound(id))?;

        let status = hold.status_at(self.clock.now());
        Ok((hold, status))
    }

    /// Explicit release before expiry (booking confirmed or abandoned).
    pub async fn cancel_hold(&self, id: Uuid) -> LedgerResult<AppointmentHold> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(LedgerError::Persistence)?
            .ok_or(LedgerError::NotFound(id))?;

        info!("Hold {} cancelled for barber {}", removed.id, removed.barber_id);
        Ok(removed)
    }

    pub async fn active_holds(
        &self,
        barber_id: &str,
        window: &SlotRange,
    ) -> LedgerResult<Vec<AppointmentHold>> {
        let barber_id = normalize_barber_id(barber_id)?;
        self.store
            .list_active_for_barber(barber_id, window, self.clock.now())
            .await
            .map_err(LedgerError::Persistence)
    }
}

/// Barber ids are stored trimmed; lookups go through the same rule.
fn normalize_barber_id(barber_id: &str) -> LedgerResult<&str> {
    let trimmed = barber_id.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("barber id must not be blank".to_string()));
    }
    Ok(trimmed)
}
