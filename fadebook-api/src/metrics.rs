use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::{error::AppError, state::AppState};

pub struct HoldMetrics {
    registry: Registry,
    pub holds_created: IntCounter,
    pub hold_conflicts: IntCounter,
    pub holds_cancelled: IntCounter,
    pub holds_swept: IntCounter,
    pub sweep_failures: IntCounter,
}

impl HoldMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::new(name, help)?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let holds_created = counter("fadebook_holds_created_total", "Appointment holds created")?;
        let hold_conflicts = counter("fadebook_hold_conflicts_total", "Hold requests rejected for an already held slot")?;
        let holds_cancelled = counter("fadebook_holds_cancelled_total", "Holds released before expiry")?;
        let holds_swept = counter("fadebook_holds_swept_total", "Expired holds deleted by sweeps")?;
        let sweep_failures = counter("fadebook_sweep_failures_total", "Sweep invocations that failed")?;

        Ok(Self {
            registry,
            holds_created,
            hold_conflicts,
            holds_cancelled,
            holds_swept,
            sweep_failures,
        })
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(export))
}

async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render().map_err(anyhow::Error::from)?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        let metrics = HoldMetrics::new().unwrap();
        metrics.holds_swept.inc_by(4);

        let text = metrics.render().unwrap();
        assert!(text.contains("fadebook_holds_swept_total 4"));
        assert!(text.contains("fadebook_holds_created_total 0"));
    }
}
