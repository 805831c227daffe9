//! In-process reservation store.
//!
//! Used when no database is configured. `create` holds the write lock across
//! the overlap re-check and the insert, so of two overlapping creates for the
//! same room only the first to take the lock succeeds.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{ReservationStore, StoreError, StoreResult};
use crate::models::Reservation;

#[derive(Debug, Default)]
pub struct MemoryReservationStore {
    reservations: RwLock<HashMap<String, Reservation>>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn list(&self) -> StoreResult<Vec<Reservation>> {
        let guard = self.reservations.read().await;
        let mut out: Vec<Reservation> = guard.values().cloned().collect();
        out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn get(&self, id: &str) -> StoreResult<Reservation> {
        self.reservations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, mut reservation: Reservation) -> StoreResult<Reservation> {
        let mut guard = self.reservations.write().await;

        if reservation.id.is_empty() {
            reservation.id = Uuid::new_v4().to_string();
        } else if guard.contains_key(&reservation.id) {
            return Err(StoreError::DuplicateId(reservation.id));
        }

        let span = reservation.span();
        if guard
            .values()
            .any(|held| held.room == reservation.room && held.span().overlaps(&span))
        {
            debug!(room = %reservation.room, "create lost overlap race");
            return Err(StoreError::Overlap);
        }

        guard.insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.reservations
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
