//! Persistence boundary for reservations.
//!
//! A store is the last word on the no-overlap invariant: admission checks a
//! snapshot, but two admissions racing for the same slot can both pass that
//! check. Every implementation must make sure at most one of them is persisted
//! and report the loser as [`StoreError::Overlap`].
//!
//! - [`memory::MemoryReservationStore`] re-checks under a write lock.
//! - [`sqlite::SqliteReservationStore`] relies on an insert trigger in the database.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Reservation;

pub use memory::MemoryReservationStore;
pub use sqlite::SqliteReservationStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reservation `{0}` not found")]
    NotFound(String),
    #[error("reservation overlaps an existing one in the same room")]
    Overlap,
    #[error("reservation id `{0}` already exists")]
    DuplicateId(String),
    #[error("stored reservation `{id}` is unreadable: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("instant {0} cannot be stored")]
    OutOfRange(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// All reservations, ordered by start.
    async fn list(&self) -> StoreResult<Vec<Reservation>>;

    async fn get(&self, id: &str) -> StoreResult<Reservation>;

    /// Persist a reservation, assigning an id if it has none.
    async fn create(&self, reservation: Reservation) -> StoreResult<Reservation>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Cheap probe used by readiness checks.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
