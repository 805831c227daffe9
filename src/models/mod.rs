//! Core data models for the room reservation service.
//!
//! `Reservation` is the persisted record, `NewReservation` the candidate a
//! front end submits, and `ReservationDto` the shape returned over HTTP.

pub mod dto;
pub mod reservation;
pub mod room;

pub use dto::ReservationDto;
pub use reservation::{NewReservation, Reservation, Timestamp};
pub use room::Room;
