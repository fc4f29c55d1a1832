use fadebook_core::{Clock, HoldLedger, HoldPolicy, HoldStore};
use fadebook_shared::models::events::HoldEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::metrics::HoldMetrics;

#[derive(Clone, Default)]
pub struct CronConfig {
    pub secret: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<HoldLedger>,
    pub events: broadcast::Sender<HoldEvent>,
    pub metrics: Arc<HoldMetrics>,
    pub cron: CronConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn HoldStore>,
        clock: Arc<dyn Clock>,
        policy: HoldPolicy,
        cron: CronConfig,
        event_capacity: usize,
    ) -> Result<Self, prometheus::Error> {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Ok(Self {
            ledger: Arc::new(HoldLedger::new(store, clock, policy)),
            events,
            metrics: Arc::new(HoldMetrics::new()?),
            cron,
        })
    }

    /// Fan an event out to stream subscribers; dropped when nobody listens.
    pub fn publish(&self, event: HoldEvent) {
        let _ = self.events.send(event);
    }
}
