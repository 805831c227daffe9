//! SQLite-backed reservation store.
//!
//! Instants are persisted twice: as RFC 3339 text, which keeps the submitter's
//! offset, and as UTC epoch nanoseconds, which the overlap trigger and the
//! ordering use. The trigger (see `migrations/0001_init.sql`) rejects a
//! same-room overlapping insert inside the statement itself, so concurrent
//! writers cannot both commit a conflicting row.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ReservationStore, StoreError, StoreResult};
use crate::models::{Reservation, Room, Timestamp};

/// Schema applied by [`SqliteReservationStore::migrate`]. Idempotent.
pub const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Message raised by the overlap trigger.
const OVERLAP_MARKER: &str = "reservation_overlap";

const SELECT_COLUMNS: &str =
    "SELECT id, start_at, end_at, room, title, description, owner_id, is_private FROM reservations";

#[derive(Clone, Debug)]
pub struct SqliteReservationStore {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ReservationRow {
    id: String,
    start_at: String,
    end_at: String,
    room: i64,
    title: String,
    description: Option<String>,
    owner_id: String,
    is_private: bool,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: row.id.clone(),
            reason,
        };

        let start = DateTime::parse_from_rfc3339(&row.start_at)
            .map_err(|e| corrupt(format!("start_at: {e}")))?;
        let end = DateTime::parse_from_rfc3339(&row.end_at)
            .map_err(|e| corrupt(format!("end_at: {e}")))?;
        let room = Room::try_from(row.room)
            .map_err(|_| corrupt(format!("unknown room {}", row.room)))?;

        Ok(Reservation {
            id: row.id,
            start,
            end,
            room,
            title: row.title,
            description: row.description,
            owner_id: row.owner_id,
            is_private: row.is_private,
        })
    }
}

impl SqliteReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database behind `database_url`.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("parsing database url `{database_url}`"))?
            .create_if_missing(true);

        let db_path = options.get_filename();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !Path::new(parent).exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
                info!("Created missing directory {:?}", parent);
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("connecting to `{database_url}`"))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the embedded schema.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!("reservation schema applied");
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
    async fn list(&self) -> StoreResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY start_ns, id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Reservation> {
        let row: Option<ReservationRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .try_into()
    }

    async fn create(&self, mut reservation: Reservation) -> StoreResult<Reservation> {
        if reservation.id.is_empty() {
            reservation.id = Uuid::new_v4().to_string();
        }

        let start_ns = epoch_nanos(&reservation.start)?;
        let end_ns = epoch_nanos(&reservation.end)?;

        let result = sqlx::query(
            "INSERT INTO reservations (
                id, start_at, end_at, start_ns, end_ns, room,
                title, description, owner_id, is_private, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&reservation.id)
        .bind(reservation.start.to_rfc3339())
        .bind(reservation.end.to_rfc3339())
        .bind(start_ns)
        .bind(end_ns)
        .bind(i64::from(reservation.room.number()))
        .bind(&reservation.title)
        .bind(reservation.description.as_deref())
        .bind(&reservation.owner_id)
        .bind(reservation.is_private)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(reservation),
            Err(err) if is_overlap_violation(&err) => Err(StoreError::Overlap),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateId(reservation.id)),
            Err(err) => Err(StoreError::Database(err)),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "unexpected probe result: {one}"
            ))));
        }
        Ok(())
    }
}

/// Full-precision instant for the comparison columns.
fn epoch_nanos(at: &Timestamp) -> StoreResult<i64> {
    at.timestamp_nanos_opt()
        .ok_or_else(|| StoreError::OutOfRange(at.to_rfc3339()))
}

/// Return true if the insert was aborted by the overlap trigger.
fn is_overlap_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().contains(OVERLAP_MARKER)
    )
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
