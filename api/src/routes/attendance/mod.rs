use crate::state::AppState;
use axum::{Router, routing::post};

mod post;

pub use post::{CheckInReq, check_in};

/// `/attendance` routes open to any authenticated user.
pub fn attendance_routes() -> Router<AppState> {
    Router::new().route("/check-in", post(check_in))
}
