pub mod admin_handlers;
pub mod health_handlers;
pub mod reservation_handlers;

use crate::services::ReservationService;
use admin_handlers::AdminAuth;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: ReservationService,
    pub admin: AdminAuth,
}

impl AppState {
    pub fn new(service: ReservationService, admin: AdminAuth) -> Self {
        Self { service, admin }
    }
}
