//! Administrator login backed by a shared password and session cookies.
//!
//! - POST /admin/login  -> checks the password, sets `admin_session`
//! - POST /admin/logout -> revokes the session and clears the cookie

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;

pub const SESSION_COOKIE: &str = "admin_session";

/// Issued administrator sessions. Cloning shares the same session set.
#[derive(Clone, Debug, Default)]
pub struct AdminAuth {
    password: Option<String>,
    sessions: Arc<RwLock<HashSet<String>>>,
}

impl AdminAuth {
    /// With no password configured nobody can log in.
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
            sessions: Arc::default(),
        }
    }

    /// Returns a fresh session token when the password matches.
    pub async fn login(&self, password: &str) -> Option<String> {
        let expected = self.password.as_deref()?;
        if password != expected {
            return None;
        }
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone());
        Some(token)
    }

    pub async fn logout(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Whether the request carries a live session cookie.
    pub async fn is_admin(&self, headers: &HeaderMap) -> bool {
        match session_token(headers) {
            Some(token) => self.sessions.read().await.contains(&token),
            None => false,
        }
    }
}

/// Extract the session token from the `Cookie` header(s).
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
    pub password: String,
}

/// `POST /admin/login`
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let Some(token) = state.admin.login(&body.password).await else {
        warn!("rejected admin login");
        return Err(AppError::unauthorized("invalid credentials"));
    };

    info!("admin session opened");
    with_cookie(format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

/// `POST /admin/logout`
pub async fn admin_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        state.admin.logout(&token).await;
    }
    with_cookie(format!(
        "{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"
    ))
}

fn with_cookie(cookie: String) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(&cookie).map_err(|e| AppError::internal(e.to_string()))?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, value)]).into_response())
}
