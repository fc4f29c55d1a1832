use anyhow::Context;
use chrono::Duration;
use fadebook_api::{app, AppState, CronConfig};
use fadebook_core::{HoldPolicy, SystemClock};
use fadebook_store::{DbClient, PgHoldStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fadebook_api=debug,fadebook_core=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fadebook_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Fadebook API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let policy = HoldPolicy::new(
        ttl_setting(config.holds.default_ttl_seconds).context("holds.default_ttl_seconds out of range")?,
        ttl_setting(config.holds.max_ttl_seconds).context("holds.max_ttl_seconds out of range")?,
    )
    .context("Invalid hold ttl configuration")?;
    if config.cron.secret.is_none() {
        tracing::warn!("No cron secret configured; the sweep trigger is open");
    }

    let app_state = AppState::new(
        Arc::new(PgHoldStore::new(db.pool.clone())),
        Arc::new(SystemClock),
        policy,
        CronConfig { secret: config.cron.secret.clone() },
        config.events.capacity,
    )?;

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn ttl_setting(seconds: u64) -> Option<Duration> {
    i64::try_from(seconds).ok().and_then(Duration::try_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_setting_rejects_wrapping_values() {
        assert_eq!(ttl_setting(600), Some(Duration::minutes(10)));
        assert_eq!(ttl_setting(u64::MAX), None);
        assert_eq!(ttl_setting(i64::MAX as u64), None);
    }
}
