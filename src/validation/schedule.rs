//! Weekly operating hours per room and the check that a reservation fits them.
//!
//! Hours are offsets from local midnight of the reservation's start day. A
//! close offset above 24 reaches into the next calendar day, so `25` on a
//! Friday means the room stays bookable until 01:00 Saturday.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

use super::local_midnight;
use crate::errors::{ReservationError, ReservationResult};
use crate::models::{Reservation, Room};

/// Latest close offset accepted from configuration (midnight of the day after next).
const MAX_CLOSE_HOUR: u8 = 48;

/// Open and close hour offsets for one weekday group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub open: u8,
    pub close: u8,
}

impl Window {
    pub const fn new(open: u8, close: u8) -> Self {
        Self { open, close }
    }
}

/// Operating hours of a single room: Mon–Thu, Fri/Sat and Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSchedule {
    pub weekday: Window,
    pub fri_sat: Window,
    pub sunday: Window,
}

impl RoomSchedule {
    pub fn window_for(&self, day: Weekday) -> Window {
        match day {
            Weekday::Fri | Weekday::Sat => self.fri_sat,
            Weekday::Sun => self.sunday,
            _ => self.weekday,
        }
    }
}

/// One entry of a schedule file.
#[derive(Debug, Deserialize)]
struct ScheduleEntry {
    room: Room,
    #[serde(flatten)]
    schedule: RoomSchedule,
}

/// Read-only mapping from room to its weekly hours.
///
/// Built once at startup and shared between all admissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTable {
    rooms: HashMap<Room, RoomSchedule>,
}

impl Default for ScheduleTable {
    fn default() -> Self {
        let late = RoomSchedule {
            weekday: Window::new(6, 23),
            fri_sat: Window::new(6, 25),
            sunday: Window::new(6, 23),
        };
        let early = RoomSchedule {
            weekday: Window::new(6, 22),
            fri_sat: Window::new(6, 23),
            sunday: Window::new(6, 22),
        };

        Self::new(HashMap::from([
            (Room::R21, late),
            (Room::R256, late),
            (Room::R132, early),
        ]))
    }
}

impl ScheduleTable {
    pub fn new(rooms: HashMap<Room, RoomSchedule>) -> Self {
        Self { rooms }
    }

    pub fn get(&self, room: Room) -> Option<&RoomSchedule> {
        self.rooms.get(&room)
    }

    /// Load a table from a JSON list of `{ room, weekday, friSat, sunday }` entries.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading schedule file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing schedule file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<ScheduleEntry> = serde_json::from_str(raw)?;
        let mut rooms = HashMap::with_capacity(entries.len());
        for entry in entries {
            let s = entry.schedule;
            for (group, window) in [
                ("weekday", s.weekday),
                ("friSat", s.fri_sat),
                ("sunday", s.sunday),
            ] {
                if window.open >= window.close || window.close > MAX_CLOSE_HOUR {
                    bail!(
                        "room {}: {} window {}..{} is not a valid range",
                        entry.room,
                        group,
                        window.open,
                        window.close
                    );
                }
            }
            if rooms.insert(entry.room, s).is_some() {
                bail!("room {} is listed more than once", entry.room);
            }
        }
        Ok(Self { rooms })
    }

    /// The whole span must fit inside the window of the start day's weekday group.
    pub fn check(&self, reservation: &Reservation) -> ReservationResult<()> {
        let schedule = self
            .get(reservation.room)
            .ok_or(ReservationError::InvalidRoom)?;

        let window = schedule.window_for(reservation.start.weekday());
        let midnight = local_midnight(&reservation.start);
        let open = midnight + TimeDelta::hours(window.open.into());
        let close = midnight + TimeDelta::hours(window.close.into());

        if reservation.start < open || reservation.end > close {
            return Err(ReservationError::InvalidTime);
        }
        Ok(())
    }
}
