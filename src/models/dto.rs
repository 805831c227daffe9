//! Client-facing view of a reservation.

use serde::Serialize;

use crate::models::reservation::{Reservation, Timestamp};

/// What the HTTP layer returns for a reservation.
///
/// `description` is omitted entirely when absent so clients can tell "no
/// details" apart from "empty details".
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub room: u16,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_private: bool,
    pub owner_id: String,
    /// Whether the viewer may delete this reservation.
    pub can_manage: bool,
}

impl ReservationDto {
    pub fn new(reservation: Reservation, viewer: Option<&str>, is_admin: bool) -> Self {
        let can_manage = is_admin || viewer == Some(reservation.owner_id.as_str());
        Self {
            id: reservation.id,
            start: reservation.start,
            end: reservation.end,
            room: reservation.room.number(),
            title: reservation.title,
            description: reservation.description,
            is_private: reservation.is_private,
            owner_id: reservation.owner_id,
            can_manage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::room::Room;
    use chrono::DateTime;

    fn reservation(description: Option<&str>) -> Reservation {
        Reservation {
            id: "abc".into(),
            start: DateTime::parse_from_rfc3339("2099-01-05T10:00:00+03:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2099-01-05T11:00:00+03:00").unwrap(),
            room: Room::R132,
            title: "Board games".into(),
            description: description.map(str::to_string),
            owner_id: "111".into(),
            is_private: true,
        }
    }

    #[test]
    fn owner_and_admin_can_manage() {
        assert!(ReservationDto::new(reservation(None), Some("111"), false).can_manage);
        assert!(ReservationDto::new(reservation(None), None, true).can_manage);
        assert!(!ReservationDto::new(reservation(None), Some("222"), false).can_manage);
        assert!(!ReservationDto::new(reservation(None), None, false).can_manage);
    }

    #[test]
    fn absent_description_is_omitted() {
        let json = serde_json::to_value(ReservationDto::new(reservation(None), None, false)).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["room"], 132);
        assert_eq!(json["isPrivate"], true);
        assert_eq!(json["ownerId"], "111");

        let json =
            serde_json::to_value(ReservationDto::new(reservation(Some("")), None, false)).unwrap();
        assert_eq!(json["description"], "");
    }
}
