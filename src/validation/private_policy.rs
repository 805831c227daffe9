//! Extra rules for private (non-official, social) reservations.
//!
//! Two sub-checks run in order: the Friday/Saturday night blackout, then the
//! per-room daily and evening quotas. Quotas are counted from the snapshot of
//! existing reservations on every call; nothing is cached between admissions.

use chrono::{Datelike, TimeDelta, Timelike, Weekday};

use super::local_midnight;
use super::overlap::Span;
use crate::errors::{ReservationError, ReservationResult};
use crate::models::Reservation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivatePolicy {
    /// Local hour on Fridays and Saturdays at which the blackout begins.
    pub blackout_start_hour: u32,
    pub blackout_hours: u32,
    /// Private reservations allowed per room per local day.
    pub daily_limit: usize,
    /// Private reservations allowed per room per evening.
    pub evening_limit: usize,
    pub evening_start_hour: u32,
}

impl Default for PrivatePolicy {
    fn default() -> Self {
        Self {
            blackout_start_hour: 23,
            blackout_hours: 7,
            daily_limit: 3,
            evening_limit: 1,
            evening_start_hour: 18,
        }
    }
}

impl PrivatePolicy {
    /// Night blackout first, then quotas.
    pub fn check(&self, candidate: &Reservation, existing: &[Reservation]) -> ReservationResult<()> {
        if self.overlaps_blackout(&candidate.span()) {
            return Err(ReservationError::InvalidTime);
        }
        self.check_quota(candidate, existing)
    }

    /// Whether the span touches any Friday or Saturday night window.
    ///
    /// Days from one before the start to one after the end are scanned, since a
    /// night window starting on one calendar day ends on the next.
    pub fn overlaps_blackout(&self, span: &Span) -> bool {
        let offset = *span.start.offset();
        let last = local_midnight(&span.end.with_timezone(&offset)) + TimeDelta::days(1);
        let mut day = local_midnight(&span.start) - TimeDelta::days(1);

        while day <= last {
            if matches!(day.weekday(), Weekday::Fri | Weekday::Sat) {
                let night_start = day + TimeDelta::hours(self.blackout_start_hour.into());
                let night = Span::new(
                    night_start,
                    night_start + TimeDelta::hours(self.blackout_hours.into()),
                );
                if span.overlaps(&night) {
                    return true;
                }
            }
            day += TimeDelta::days(1);
        }
        false
    }

    /// Count private reservations in the same room that start on the candidate's
    /// local day, and how many of those start in the evening.
    pub fn check_quota(
        &self,
        candidate: &Reservation,
        existing: &[Reservation],
    ) -> ReservationResult<()> {
        let offset = *candidate.start.offset();
        let day = candidate.start.date_naive();

        let (daily, evening) = existing
            .iter()
            .filter(|e| e.is_private && e.room == candidate.room)
            .map(|e| e.start.with_timezone(&offset))
            .filter(|start| start.date_naive() == day)
            .fold((0usize, 0usize), |(daily, evening), start| {
                let is_evening = start.hour() >= self.evening_start_hour;
                (daily + 1, evening + usize::from(is_evening))
            });

        if daily >= self.daily_limit {
            return Err(ReservationError::PrivateDailyLimit);
        }
        if candidate.start.hour() >= self.evening_start_hour && evening >= self.evening_limit {
            return Err(ReservationError::PrivateEveningLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Room;
    use chrono::DateTime;

    fn private(room: Room, start: &str, end: &str) -> Reservation {
        Reservation {
            id: format!("{room}-{start}"),
            start: DateTime::parse_from_rfc3339(start).unwrap(),
            end: DateTime::parse_from_rfc3339(end).unwrap(),
            room,
            title: "party".into(),
            description: None,
            owner_id: "7".into(),
            is_private: true,
        }
    }

    fn in_blackout(start: &str, end: &str) -> bool {
        PrivatePolicy::default().overlaps_blackout(&private(Room::R21, start, end).span())
    }

    #[test]
    fn friday_night_crossing_midnight_is_blacked_out() {
        // 2099-01-09 is a Friday
        assert!(in_blackout("2099-01-09T23:30:00+03:00", "2099-01-10T00:30:00+03:00"));
        // same night, but the span starts after midnight so its day is Saturday
        assert!(in_blackout("2099-01-10T00:10:00+03:00", "2099-01-10T00:50:00+03:00"));
    }

    #[test]
    fn saturday_night_runs_into_sunday_morning() {
        assert!(in_blackout("2099-01-11T05:00:00Z", "2099-01-11T06:00:00Z"));
        assert!(!in_blackout("2099-01-11T06:00:00Z", "2099-01-11T07:00:00Z"));
    }

    #[test]
    fn other_nights_are_open() {
        // Thursday and Sunday nights
        assert!(!in_blackout("2099-01-08T23:30:00Z", "2099-01-09T00:30:00Z"));
        assert!(!in_blackout("2099-01-11T23:30:00Z", "2099-01-12T00:30:00Z"));
    }

    #[test]
    fn ending_at_blackout_start_is_allowed() {
        assert!(!in_blackout("2099-01-09T21:00:00Z", "2099-01-09T23:00:00Z"));
        assert!(in_blackout("2099-01-09T21:00:00Z", "2099-01-09T23:01:00Z"));
    }

    #[test]
    fn fourth_private_reservation_of_the_day_rejected() {
        let existing = vec![
            private(Room::R21, "2099-01-05T08:00:00Z", "2099-01-05T09:00:00Z"),
            private(Room::R21, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00Z"),
            private(Room::R21, "2099-01-05T12:00:00Z", "2099-01-05T13:00:00Z"),
        ];
        let candidate = private(Room::R21, "2099-01-05T14:00:00Z", "2099-01-05T15:00:00Z");
        assert!(matches!(
            PrivatePolicy::default().check(&candidate, &existing),
            Err(ReservationError::PrivateDailyLimit)
        ));
    }

    #[test]
    fn quotas_ignore_other_rooms_days_and_public_reservations() {
        let mut public = private(Room::R21, "2099-01-05T08:00:00Z", "2099-01-05T09:00:00Z");
        public.is_private = false;
        let existing = vec![
            public,
            private(Room::R132, "2099-01-05T10:00:00Z", "2099-01-05T11:00:00Z"),
            private(Room::R21, "2099-01-06T12:00:00Z", "2099-01-06T13:00:00Z"),
            private(Room::R21, "2099-01-05T12:00:00Z", "2099-01-05T13:00:00Z"),
            private(Room::R21, "2099-01-05T14:00:00Z", "2099-01-05T15:00:00Z"),
        ];
        let candidate = private(Room::R21, "2099-01-05T16:00:00Z", "2099-01-05T17:00:00Z");
        assert!(PrivatePolicy::default().check(&candidate, &existing).is_ok());
    }

    #[test]
    fn second_evening_private_rejected_but_daytime_allowed() {
        let existing = vec![
            private(Room::R256, "2099-01-05T09:00:00Z", "2099-01-05T10:00:00Z"),
            private(Room::R256, "2099-01-05T18:00:00Z", "2099-01-05T19:00:00Z"),
        ];
        let evening = private(Room::R256, "2099-01-05T20:00:00Z", "2099-01-05T21:00:00Z");
        assert!(matches!(
            PrivatePolicy::default().check(&evening, &existing),
            Err(ReservationError::PrivateEveningLimit)
        ));

        let daytime = private(Room::R256, "2099-01-05T12:00:00Z", "2099-01-05T13:00:00Z");
        assert!(PrivatePolicy::default().check(&daytime, &existing).is_ok());
    }

    #[test]
    fn existing_starts_are_read_in_candidate_offset() {
        // 21:30Z on the 4th is 00:30 on the 5th at +03:00, and counts as evening-free
        let existing = vec![
            private(Room::R21, "2099-01-04T21:30:00Z", "2099-01-04T22:00:00Z"),
            private(Room::R21, "2099-01-05T10:00:00+03:00", "2099-01-05T11:00:00+03:00"),
            private(Room::R21, "2099-01-05T12:00:00+03:00", "2099-01-05T13:00:00+03:00"),
        ];
        let candidate = private(
            Room::R21,
            "2099-01-05T14:00:00+03:00",
            "2099-01-05T15:00:00+03:00",
        );
        assert!(matches!(
            PrivatePolicy::default().check(&candidate, &existing),
            Err(ReservationError::PrivateDailyLimit)
        ));
    }
}
