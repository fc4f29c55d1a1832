use axum::{extract::State, routing::get, Json, Router};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use fadebook_shared::models::events::HoldEvent;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub deleted_count: u64,
    pub timestamp: String,
}

fn token_matches(presented: Option<&str>, secret: &str) -> bool {
    presented.is_some_and(|token| bool::from(token.as_bytes().ct_eq(secret.as_bytes())))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/cron/cleanup-holds", get(cleanup_holds).post(cleanup_holds))
}

/// Sweep trigger for the external scheduler. One bulk delete per call, no
/// partial success.
async fn cleanup_holds(
    State(state): State<AppState>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<Json<CleanupResponse>, AppError> {
    if let Some(secret) = state.cron.secret.as_deref() {
        // Missing or non-Bearer credentials count as no token
        let presented = auth.as_ref().ok().map(|TypedHeader(a)| a.token());
        if !token_matches(presented, secret) {
            warn!("Rejected sweep trigger with missing or invalid cron secret");
            return Err(AppError::AuthenticationError("Unauthorized".to_string()));
        }
    }

    let report = match state.ledger.sweep_expired_now().await {
        Ok(report) => report,
        Err(e) => {
            state.metrics.sweep_failures.inc();
            return Err(e.into());
        }
    };

    info!("Cleanup removed {} expired holds", report.deleted_count);
    state.metrics.holds_swept.inc_by(report.deleted_count);
    if report.deleted_count > 0 {
        state.publish(HoldEvent::Swept {
            deleted_count: report.deleted_count,
            swept_at: report.swept_at,
        });
    }

    Ok(Json(CleanupResponse {
        success: true,
        deleted_count: report.deleted_count,
        timestamp: report.swept_at.to_rfc3339(),
    }))
}
