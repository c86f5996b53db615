//! HTTP route entry point for `/api/...`.
//!
//! - `/modules/{module_id}/attendance` → instructor session and marking routes
//! - `/attendance` → student self-check-in

use crate::auth::guards::allow_authenticated;
use crate::routes::{attendance::attendance_routes, modules::modules_routes};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod attendance;
pub mod common;
pub mod modules;

/// Builds the router for every `/api` endpoint, with state applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/modules", modules_routes(app_state.clone()))
        .nest(
            "/attendance",
            attendance_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
