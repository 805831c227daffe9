//! src/services/reservation_service.rs
//!
//! ReservationService: the single entry point front ends use to list, read,
//! admit and delete reservations. It runs the admission pipeline against a
//! fresh snapshot of the store, hands accepted reservations to the store, and
//! fires a best-effort notification afterwards.

use chrono::Utc;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};

use crate::errors::{ReservationError, ReservationResult};
use crate::models::{NewReservation, Reservation};
use crate::notify::Notifier;
use crate::store::{ReservationStore, StoreResult};
use crate::validation::AdmissionPipeline;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    pipeline: Arc<AdmissionPipeline>,
    notifier: Arc<dyn Notifier>,
    /// Deadline applied to every individual store call.
    store_timeout: Duration,
}

impl ReservationService {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        pipeline: Arc<AdmissionPipeline>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            pipeline,
            notifier,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn list_reservations(&self) -> ReservationResult<Vec<Reservation>> {
        self.call_store("list", self.store.list()).await
    }

    pub async fn get_reservation(&self, id: &str) -> ReservationResult<Reservation> {
        self.call_store("get", self.store.get(id)).await
    }

    /// Admit a candidate and persist it.
    ///
    /// Intrinsic checks run before the store is read at all, so a malformed
    /// candidate never costs a round trip. The store may still reject the
    /// result with `Overlap` if a concurrent admission got there first.
    #[instrument(skip(self, input), fields(room = input.room, private = input.is_private))]
    pub async fn create_reservation(
        &self,
        input: NewReservation,
    ) -> ReservationResult<Reservation> {
        let now = Utc::now().fixed_offset();
        let candidate = self
            .pipeline
            .check_intrinsic(input, now)
            .inspect_err(|err| debug!(%err, "candidate rejected"))?;

        let existing = self.call_store("list", self.store.list()).await?;
        self.pipeline
            .check_against(&candidate, &existing)
            .inspect_err(|err| debug!(%err, "candidate rejected"))?;

        let created = self
            .call_store("create", self.store.create(candidate))
            .await
            .inspect_err(|err| debug!(%err, "store refused reservation"))?;

        info!(id = %created.id, "reservation admitted");
        self.spawn_notification(created.clone());
        Ok(created)
    }

    /// Delete a reservation on behalf of its owner or an administrator.
    ///
    /// An empty requester never counts as the owner.
    #[instrument(skip(self))]
    pub async fn delete_reservation(
        &self,
        id: &str,
        requester: &str,
        is_admin: bool,
    ) -> ReservationResult<()> {
        let reservation = self.call_store("get", self.store.get(id)).await?;
        if !is_admin && (requester.is_empty() || reservation.owner_id != requester) {
            debug!(owner = %reservation.owner_id, "delete refused");
            return Err(ReservationError::Forbidden);
        }

        self.call_store("delete", self.store.delete(id)).await?;
        info!(id, "reservation deleted");
        Ok(())
    }

    pub async fn health_check(&self) -> ReservationResult<()> {
        self.call_store("health_check", self.store.health_check())
            .await
    }

    /// Run a store call under the configured deadline.
    ///
    /// On expiry the call's future is dropped, which aborts it.
    async fn call_store<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> ReservationResult<T> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(ReservationError::from),
            Err(_) => {
                warn!(op, timeout = ?self.store_timeout, "store call timed out");
                Err(ReservationError::Timeout {
                    op,
                    timeout: self.store_timeout,
                })
            }
        }
    }

    fn spawn_notification(&self, reservation: Reservation) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.notify_created(&reservation).await {
                warn!(id = %reservation.id, error = %err, "failed to send notification");
            }
        });
    }
}
