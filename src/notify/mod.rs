//! Best-effort announcements of newly created reservations.
//!
//! Notifiers run detached from the request that created the reservation; a
//! failed delivery is logged and otherwise ignored.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::Reservation;

pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_created(&self, reservation: &Reservation) -> Result<()>;
}

/// Writes new reservations to the log. Used when no chat is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_created(&self, reservation: &Reservation) -> Result<()> {
        info!(
            id = %reservation.id,
            room = %reservation.room,
            start = %reservation.start,
            end = %reservation.end,
            private = reservation.is_private,
            "reservation created"
        );
        Ok(())
    }
}
