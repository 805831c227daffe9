use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{fmt, time::Duration};
use thiserror::Error;

use crate::store::StoreError;

/// Every way an admission, lookup or deletion can fail.
///
/// The first block of variants are the deterministic rule violations surfaced by
/// the admission pipeline; `Overlap` is shared with the store so a conflict looks
/// the same whichever layer caught it.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("room number is not one of the bookable rooms")]
    InvalidRoom,
    #[error("reservations cannot start in the past")]
    InPast,
    #[error("end time must be after start time")]
    InvalidPeriod,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("reservation is longer than the maximum allowed duration")]
    TooLongDuration,
    #[error("reservations are not allowed at this time")]
    InvalidTime,
    #[error("daily limit of private reservations reached for this room")]
    PrivateDailyLimit,
    #[error("evening limit of private reservations reached for this room")]
    PrivateEveningLimit,
    #[error("reservation overlaps an existing one")]
    Overlap,
    #[error("reservation `{0}` not found")]
    NotFound(String),
    #[error("operation is not allowed for this user")]
    Forbidden,
    #[error("store call `{op}` did not finish within {timeout:?}")]
    Timeout { op: &'static str, timeout: Duration },
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type ReservationResult<T> = Result<T, ReservationError>;

impl ReservationError {
    /// Whether the error is a caller mistake that retrying unchanged cannot fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReservationError::InvalidRoom
                | ReservationError::InPast
                | ReservationError::InvalidPeriod
                | ReservationError::EmptyTitle
                | ReservationError::TooLongDuration
                | ReservationError::InvalidTime
                | ReservationError::PrivateDailyLimit
                | ReservationError::PrivateEveningLimit
                | ReservationError::Overlap
        )
    }
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ReservationError::NotFound(id),
            StoreError::Overlap => ReservationError::Overlap,
            other => ReservationError::Storage(other.to_string()),
        }
    }
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        let status = match &err {
            ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
            ReservationError::Forbidden => StatusCode::FORBIDDEN,
            ReservationError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ReservationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(format!("invalid json: {}", rejection.body_text()))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
