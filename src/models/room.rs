//! The fixed set of bookable rooms.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ReservationError;

/// A bookable room, identified on the wire by its door number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Room {
    R21,
    R132,
    R256,
}

impl Room {
    pub const ALL: [Room; 3] = [Room::R21, Room::R132, Room::R256];

    pub fn number(self) -> u16 {
        match self {
            Room::R21 => 21,
            Room::R132 => 132,
            Room::R256 => 256,
        }
    }
}

impl TryFrom<u16> for Room {
    type Error = ReservationError;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        Room::ALL
            .into_iter()
            .find(|room| room.number() == number)
            .ok_or(ReservationError::InvalidRoom)
    }
}

/// Numbers as they arrive from JSON, where any integer is accepted.
impl TryFrom<i64> for Room {
    type Error = ReservationError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        u16::try_from(number)
            .map_err(|_| ReservationError::InvalidRoom)
            .and_then(<Room as TryFrom<u16>>::try_from)
    }
}

impl From<Room> for u16 {
    fn from(room: Room) -> Self {
        room.number()
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
