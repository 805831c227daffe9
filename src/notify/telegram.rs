//! Posts new reservations to a Telegram chat through the Bot API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::models::Reservation;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Upper bound for one `sendMessage` round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: i64,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE, token, chat_id, REQUEST_TIMEOUT)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: i64,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building telegram http client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id,
        })
    }
}

/// Human-readable summary sent to the chat.
pub fn format_message(reservation: &Reservation) -> String {
    format!(
        "New reservation\nRoom: {}\nFrom: {}\nTo: {}\nTitle: {}\nOwner: {}\nPrivate: {}",
        reservation.room,
        reservation.start.format("%d.%m.%Y %H:%M"),
        reservation.end.format("%d.%m.%Y %H:%M"),
        reservation.title,
        reservation.owner_id,
        if reservation.is_private { "yes" } else { "no" },
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_created(&self, reservation: &Reservation) -> Result<()> {
        let text = format_message(reservation);
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);

        self.client
            .post(&url)
            .json(&SendMessage {
                chat_id: self.chat_id,
                text: &text,
            })
            .send()
            .await
            .context("sending telegram message")?
            .error_for_status()
            .context("telegram rejected message")?;

        Ok(())
    }
}
