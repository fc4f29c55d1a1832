use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use fadebook_core::{AppointmentHold, HoldStatus, SlotRange};
use fadebook_shared::models::events::{HoldEvent, HoldSnapshot};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHoldRequest {
    pub barber_id: String,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    /// Falls back to the configured default when absent
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldResponse {
    #[serde(flatten)]
    pub hold: HoldSnapshot,
    pub status: HoldStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SlotHeldResponse {
    pub held: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub barber_id: Option<String>,
}

pub fn snapshot(hold: &AppointmentHold) -> HoldSnapshot {
    HoldSnapshot {
        id: hold.id,
        barber_id: hold.barber_id.clone(),
        slot_start: hold.slot.start(),
        slot_end: hold.slot.end(),
        created_at: hold.created_at,
        expires_at: hold.expires_at,
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_hold))
        .route("/v1/holds/stream", get(stream_holds))
        .route("/v1/holds/{id}", get(get_hold).delete(cancel_hold))
        .route("/v1/barbers/{barber_id}/holds", get(list_barber_holds))
        .route("/v1/barbers/{barber_id}/held", get(slot_held))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/holds
async fn create_hold(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateHoldRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slot = SlotRange::new(req.slot_start, req.slot_end)?;
    let ttl = req
        .ttl_seconds
        .map(|secs| {
            Duration::try_seconds(secs)
                .ok_or_else(|| AppError::ValidationError(format!("ttl of {}s is out of range", secs)))
        })
        .transpose()?;

    let hold = match state.ledger.create_hold(&req.barber_id, slot, ttl).await {
        Ok(hold) => hold,
        Err(e) => {
            if matches!(e, fadebook_core::LedgerError::Conflict { .. }) {
                state.metrics.hold_conflicts.inc();
            }
            return Err(e.into());
        }
    };

    state.metrics.holds_created.inc();
    let snapshot = snapshot(&hold);
    state.publish(HoldEvent::Created { hold: snapshot.clone() });

    Ok((
        StatusCode::CREATED,
        Json(HoldResponse { hold: snapshot, status: HoldStatus::Active }),
    ))
}

/// GET /v1/holds/{id}
async fn get_hold(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<HoldResponse>, AppError> {
    let (hold, status) = state.ledger.get_hold(id).await?;
    Ok(Json(HoldResponse { hold: snapshot(&hold), status }))
}

/// DELETE /v1/holds/{id}
async fn cancel_hold(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state.ledger.cancel_hold(id).await?;

    state.metrics.holds_cancelled.inc();
    state.publish(HoldEvent::Cancelled {
        hold_id: removed.id,
        barber_id: removed.barber_id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/barbers/{barber_id}/holds?from=..&to=..
async fn list_barber_holds(
    State(state): State<AppState>,
    ApiPath(barber_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<WindowQuery>,
) -> Result<Json<Vec<HoldSnapshot>>, AppError> {
    let window = SlotRange::new(query.from, query.to)?;
    let holds = state.ledger.active_holds(&barber_id, &window).await?;
    Ok(Json(holds.iter().map(snapshot).collect()))
}

/// GET /v1/barbers/{barber_id}/held?slotStart=..&slotEnd=..
async fn slot_held(
    State(state): State<AppState>,
    ApiPath(barber_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<SlotQuery>,
) -> Result<Json<SlotHeldResponse>, AppError> {
    let slot = SlotRange::new(query.slot_start, query.slot_end)?;
    let held = state
        .ledger
        .is_slot_held(&barber_id, &slot, state.ledger.now())
        .await?;
    Ok(Json(SlotHeldResponse { held }))
}

/// GET /v1/holds/stream?barberId=..
async fn stream_holds(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.events.subscribe();
    let barber_filter = query.barber_id;

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| {
        let barber_filter = barber_filter.clone();
        async move {
            // Lagged receivers skip what they missed
            let event = result.ok()?;
            let wanted = match (&barber_filter, event.barber_id()) {
                (Some(wanted), Some(barber)) => wanted == barber,
                _ => true,
            };
            if !wanted {
                return None;
            }
            Some(Event::default().event(event.name()).json_data(&event))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
