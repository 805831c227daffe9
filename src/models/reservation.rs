//! Represents a reservation of one room for one contiguous time span.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::errors::{ReservationError, ReservationResult};
use crate::models::room::Room;
use crate::validation::overlap::Span;

/// Timezone-aware instant. Local-time rules use the offset carried here.
pub type Timestamp = DateTime<FixedOffset>;

/// A persisted reservation.
///
/// Immutable once created; the only way to change one is to delete it and
/// admit a new one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Opaque identifier assigned by the store when left empty.
    pub id: String,

    /// Inclusive start of the half-open span.
    pub start: Timestamp,

    /// Exclusive end of the half-open span.
    pub end: Timestamp,

    pub room: Room,

    /// Short label shown in listings.
    pub title: String,

    /// Optional free text. `None` and `Some("")` are kept distinct.
    pub description: Option<String>,

    /// Identity of the person who booked, as issued by an external identity source.
    pub owner_id: String,

    /// Private social gatherings are subject to night and quota restrictions.
    pub is_private: bool,
}

impl Reservation {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// A candidate reservation as submitted by a front end, before admission.
///
/// The room is still a raw number here; turning it into a [`Room`] is the
/// first thing admission checks.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Raw room number; anything outside the bookable set fails admission, not parsing.
    pub room: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub is_private: bool,
}

impl NewReservation {
    /// Check the invariants that need no context beyond the current instant.
    ///
    /// Order matters and callers rely on it: room, then past, then period,
    /// then title. Returns the reservation with an empty id on success.
    pub fn validate_basic(self, now: Timestamp) -> ReservationResult<Reservation> {
        let room = Room::try_from(self.room)?;
        if self.start <= now {
            return Err(ReservationError::InPast);
        }
        if self.end <= self.start {
            return Err(ReservationError::InvalidPeriod);
        }
        if self.title.trim().is_empty() {
            return Err(ReservationError::EmptyTitle);
        }

        Ok(Reservation {
            id: String::new(),
            start: self.start,
            end: self.end,
            room,
            title: self.title,
            description: self.description,
            owner_id: self.owner_id,
            is_private: self.is_private,
        })
    }
}
