use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

/// Half-open `[start, end)` range identifying a barber's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SlotRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, LedgerError> {
        if end <= start {
            return Err(LedgerError::Validation(format!(
                "slot range is empty: {} .. {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Touching ranges (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &SlotRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Read-time classification of a stored hold. A removed hold has no row at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentHold {
    pub id: Uuid,
    pub barber_id: String,
    pub slot: SlotRange,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AppointmentHold {
    pub fn new(
        barber_id: impl Into<String>,
        slot: SlotRange,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, LedgerError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            LedgerError::Validation(format!("ttl of {}s overflows the expiry time", ttl.num_seconds()))
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            barber_id: barber_id.into(),
            slot,
            created_at: now,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> HoldStatus {
        if self.is_expired(now) {
            HoldStatus::Expired
        } else {
            HoldStatus::Active
        }
    }

    /// An expired hold never blocks, regardless of whether a sweep has run.
    pub fn blocks(&self, barber_id: &str, slot: &SlotRange, now: DateTime<Utc>) -> bool {
        self.barber_id == barber_id && self.is_active(now) && self.slot.overlaps(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_slot_rejected() {
        assert!(matches!(SlotRange::new(at(10, 0), at(10, 0)), Err(LedgerError::Validation(_))));
        assert!(matches!(SlotRange::new(at(10, 30), at(10, 0)), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let morning = SlotRange::new(at(9, 0), at(9, 30)).unwrap();
        let next = SlotRange::new(at(9, 30), at(10, 0)).unwrap();
        let straddle = SlotRange::new(at(9, 15), at(9, 45)).unwrap();

        assert!(!morning.overlaps(&next));
        assert!(morning.overlaps(&straddle));
        assert!(straddle.overlaps(&next));
        assert_eq!(morning.duration(), Duration::minutes(30));
    }

    #[test]
    fn test_status_boundary() {
        let slot = SlotRange::new(at(15, 0), at(15, 45)).unwrap();
        let hold = AppointmentHold::new("barber-1", slot, at(12, 0), Duration::minutes(5)).unwrap();

        assert_eq!(hold.status_at(at(12, 4)), HoldStatus::Active);
        // expires_at == now already counts as expired
        assert_eq!(hold.status_at(at(12, 5)), HoldStatus::Expired);
        assert!(!hold.blocks("barber-1", &slot, at(12, 5)));
        assert!(hold.blocks("barber-1", &slot, at(12, 1)));
        assert!(!hold.blocks("barber-2", &slot, at(12, 1)));
    }

    #[test]
    fn test_expiry_overflow_rejected() {
        let slot = SlotRange::new(at(15, 0), at(15, 45)).unwrap();
        let result = AppointmentHold::new("barber-1", slot, DateTime::<Utc>::MAX_UTC, Duration::seconds(1));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }
}
