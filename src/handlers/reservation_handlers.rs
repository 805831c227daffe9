//! HTTP handlers for reservation operations.
//! Validation and persistence live in `ReservationService`; these only
//! translate between JSON and the service, and decide who is looking.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use super::AppState;
use crate::{
    errors::AppError,
    models::{NewReservation, ReservationDto},
};

/// Identity of the caller for ownership checks, passed as `?requester=`.
#[derive(Debug, Default, Deserialize)]
pub struct RequesterQuery {
    pub requester: Option<String>,
}

/// `GET /reservations`
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(q): Query<RequesterQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<ReservationDto>>, AppError> {
    let is_admin = state.admin.is_admin(&headers).await;
    let reservations = state.service.list_reservations().await?;

    let out = reservations
        .into_iter()
        .map(|r| ReservationDto::new(r, q.requester.as_deref(), is_admin))
        .collect();
    Ok(Json(out))
}

/// `GET /reservations/{id}`
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<RequesterQuery>,
    headers: HeaderMap,
) -> Result<Json<ReservationDto>, AppError> {
    let is_admin = state.admin.is_admin(&headers).await;
    let reservation = state.service.get_reservation(&id).await?;
    Ok(Json(ReservationDto::new(
        reservation,
        q.requester.as_deref(),
        is_admin,
    )))
}

/// `POST /reservations`
pub async fn create_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewReservation>, JsonRejection>,
) -> Result<Json<ReservationDto>, AppError> {
    let Json(input) = payload?;
    let is_admin = state.admin.is_admin(&headers).await;
    let created = state.service.create_reservation(input).await?;

    let owner = created.owner_id.clone();
    Ok(Json(ReservationDto::new(created, Some(&owner), is_admin)))
}

/// `DELETE /reservations/{id}`
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<RequesterQuery>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let is_admin = state.admin.is_admin(&headers).await;
    let requester = q.requester.unwrap_or_default();

    state
        .service
        .delete_reservation(&id, &requester, is_admin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
