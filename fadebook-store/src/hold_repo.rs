use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fadebook_core::store::{HoldStore, StoreError, StoreResult};
use fadebook_core::{AppointmentHold, SlotRange};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const HOLD_COLUMNS: &str = "id, barber_id, slot_start, slot_end, created_at, expires_at";

#[derive(Debug, sqlx::FromRow)]
struct HoldRow {
    id: Uuid,
    barber_id: String,
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<HoldRow> for AppointmentHold {
    type Error = StoreError;

    fn try_from(row: HoldRow) -> Result<Self, Self::Error> {
        let slot = SlotRange::new(row.slot_start, row.slot_end).map_err(StoreError::backend)?;
        Ok(AppointmentHold {
            id: row.id,
            barber_id: row.barber_id,
            slot,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

fn into_holds(rows: Vec<HoldRow>) -> StoreResult<Vec<AppointmentHold>> {
    rows.into_iter().map(AppointmentHold::try_from).collect()
}

pub struct PgHoldStore {
    pub pool: PgPool,
}

impl PgHoldStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HoldStore for PgHoldStore {
    async fn insert_exclusive(&self, hold: &AppointmentHold, now: DateTime<Utc>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        // Serializes writers per barber until commit/rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&hold.barber_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM appointment_holds
            WHERE barber_id = $1 AND expires_at > $2 AND slot_start < $4 AND slot_end > $3
            LIMIT 1
            "#,
        )
        .bind(&hold.barber_id)
        .bind(now)
        .bind(hold.slot.start())
        .bind(hold.slot.end())
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        if let Some((existing_id,)) = existing {
            tx.rollback().await.map_err(StoreError::backend)?;
            return Err(StoreError::Conflict(existing_id));
        }

        sqlx::query(
            r#"
            INSERT INTO appointment_holds (id, barber_id, slot_start, slot_end, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(hold.id)
        .bind(&hold.barber_id)
        .bind(hold.slot.start())
        .bind(hold.slot.end())
        .bind(hold.created_at)
        .bind(hold.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        debug!("Inserted hold {} for barber {}", hold.id, hold.barber_id);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>> {
        let row: Option<HoldRow> = sqlx::query_as(&format!(
            "SELECT {HOLD_COLUMNS} FROM appointment_holds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(AppointmentHold::try_from).transpose()
    }

    async fn find_active_overlapping(
        &self,
        barber_id: &str,
        slot: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>> {
        let rows: Vec<HoldRow> = sqlx::query_as(&format!(
            r#"
            SELECT {HOLD_COLUMNS} FROM appointment_holds
            WHERE barber_id = $1 AND expires_at > $2 AND slot_start < $4 AND slot_end > $3
            "#
        ))
        .bind(barber_id)
        .bind(now)
        .bind(slot.start())
        .bind(slot.end())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_holds(rows)
    }

    async fn list_active_for_barber(
        &self,
        barber_id: &str,
        window: &SlotRange,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<AppointmentHold>> {
        let rows: Vec<HoldRow> = sqlx::query_as(&format!(
            r#"
            SELECT {HOLD_COLUMNS} FROM appointment_holds
            WHERE barber_id = $1 AND expires_at > $2 AND slot_start < $4 AND slot_end > $3
            ORDER BY slot_start ASC
            "#
        ))
        .bind(barber_id)
        .bind(now)
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_holds(rows)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<AppointmentHold>> {
        let row: Option<HoldRow> = sqlx::query_as(&format!(
            "DELETE FROM appointment_holds WHERE id = $1 RETURNING {HOLD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(AppointmentHold::try_from).transpose()
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM appointment_holds WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected())
    }
}
