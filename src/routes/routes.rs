//! Defines routes for reservation, admin and health endpoints.
//!
//! ## Structure
//! - **Reservation endpoints**
//!   - `GET    /reservations`      -> list reservations (`?requester=` for `canManage`)
//!   - `POST   /reservations`      -> admit a new reservation
//!   - `GET    /reservations/{id}` -> fetch one reservation
//!   - `DELETE /reservations/{id}` -> delete (owner via `?requester=`, or admin session)
//!
//! - **Admin endpoints**
//!   - `POST   /admin/login`  -> open an admin session cookie
//!   - `POST   /admin/logout` -> close it
//!
//! Every route sits behind a credentialed CORS layer so browser front ends on
//! other origins can use the admin session cookie.

use crate::handlers::{
    AppState,
    admin_handlers::{admin_login, admin_logout},
    health_handlers::{healthz, readyz},
    reservation_handlers::{
        create_reservation, delete_reservation, get_reservation, list_reservations,
    },
};
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build and return the router for all endpoints.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // admin session
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        // reservations
        .route(
            "/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(get_reservation).delete(delete_reservation),
        )
        .layer(cors_layer())
}

/// Any origin may call the API with credentials. The request origin is
/// echoed back since browsers refuse `*` for credentialed requests.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
