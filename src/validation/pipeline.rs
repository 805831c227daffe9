//! Ordered admission decision for a candidate reservation.
//!
//! Checks short-circuit on the first failure in this order:
//! room → past → period → title → duration → schedule → private night →
//! private quota → overlap.
//!
//! The pipeline holds only immutable configuration, so one instance is shared
//! by every concurrent admission. It never writes anything; persisting the
//! result (and arbitrating races between concurrent admissions) is the store's job.

use chrono::TimeDelta;
use std::sync::Arc;
use tracing::debug;

use super::private_policy::PrivatePolicy;
use super::schedule::ScheduleTable;
use crate::errors::{ReservationError, ReservationResult};
use crate::models::{NewReservation, Reservation, Timestamp};

pub const MAX_DURATION_HOURS: i64 = 3;

#[derive(Debug, Clone)]
pub struct AdmissionPipeline {
    schedule: Arc<ScheduleTable>,
    private: PrivatePolicy,
    max_duration: TimeDelta,
}

impl AdmissionPipeline {
    pub fn new(schedule: Arc<ScheduleTable>) -> Self {
        Self::with_policy(schedule, PrivatePolicy::default())
    }

    pub fn with_policy(schedule: Arc<ScheduleTable>, private: PrivatePolicy) -> Self {
        Self {
            schedule,
            private,
            max_duration: TimeDelta::hours(MAX_DURATION_HOURS),
        }
    }

    pub fn schedule(&self) -> &ScheduleTable {
        &self.schedule
    }

    /// Run every check against a snapshot of existing reservations.
    pub fn evaluate(
        &self,
        candidate: NewReservation,
        existing: &[Reservation],
        now: Timestamp,
    ) -> ReservationResult<Reservation> {
        let reservation = self.check_intrinsic(candidate, now)?;
        self.check_against(&reservation, existing)?;
        Ok(reservation)
    }

    /// Checks that need nothing but the candidate itself and the clock.
    pub fn check_intrinsic(
        &self,
        candidate: NewReservation,
        now: Timestamp,
    ) -> ReservationResult<Reservation> {
        let reservation = candidate.validate_basic(now)?;
        if reservation.duration() > self.max_duration {
            return Err(ReservationError::TooLongDuration);
        }
        self.schedule.check(&reservation)?;
        Ok(reservation)
    }

    /// Checks that depend on the reservations already held.
    pub fn check_against(
        &self,
        reservation: &Reservation,
        existing: &[Reservation],
    ) -> ReservationResult<()> {
        if reservation.is_private {
            self.private.check(reservation, existing)?;
        }

        let span = reservation.span();
        if let Some(conflict) = existing
            .iter()
            .filter(|e| e.room == reservation.room)
            .find(|e| e.span().overlaps(&span))
        {
            debug!(room = %reservation.room, conflict = %conflict.id, "overlapping reservation");
            return Err(ReservationError::Overlap);
        }
        Ok(())
    }
}
