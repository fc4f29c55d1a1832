use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Wire view of an appointment hold as carried in events and API bodies.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldSnapshot {
    pub id: Uuid,
    pub barber_id: String,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HoldEvent {
    Created {
        hold: HoldSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Cancelled {
        hold_id: Uuid,
        barber_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Swept {
        deleted_count: u64,
        swept_at: DateTime<Utc>,
    },
}

impl HoldEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HoldEvent::Created { .. } => "hold_created",
            HoldEvent::Cancelled { .. } => "hold_cancelled",
            HoldEvent::Swept { .. } => "holds_swept",
        }
    }

    /// Barber the event concerns; sweeps span every barber.
    pub fn barber_id(&self) -> Option<&str> {
        match self {
            HoldEvent::Created { hold } => Some(&hold.barber_id),
            HoldEvent::Cancelled { barber_id, .. } => Some(barber_id),
            HoldEvent::Swept { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swept_event_wire_shape() {
        let swept_at = Utc::now();
        let event = HoldEvent::Swept { deleted_count: 3, swept_at };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "swept");
        assert_eq!(json["deletedCount"], 3);
        assert!(json.get("sweptAt").is_some());
        assert_eq!(event.barber_id(), None);
    }

    #[test]
    fn test_cancelled_event_names_barber() {
        let event = HoldEvent::Cancelled { hold_id: Uuid::new_v4(), barber_id: "b-7".to_string() };
        assert_eq!(event.name(), "hold_cancelled");
        assert_eq!(event.barber_id(), Some("b-7"));
    }
}
