//! `/modules/{module_id}/attendance` routes. Everything here requires the
//! instructor capability for the module.
//!
//! - `GET  /sessions`                      → session summaries
//! - `POST /sessions`                      → open a session
//! - `GET  /sessions/{session_id}`         → one summary
//! - `POST /sessions/{session_id}/close`   → close a session
//! - `GET  /records?date=YYYY-MM-DD`       → day roster
//! - `POST /records/bulk`                  → bulk marking
//! - `PUT  /records/{user_id}`             → manual mark

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::auth::guards::allow_instructor;
use crate::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use common::{
    BulkMarkReq, CreateSessionReq, ManualMarkReq, RecordQuery, RosterEntry,
};
pub use get::{get_session, list_records, list_sessions};
pub use post::{close_session, create_session, mark_bulk};
pub use put::mark_manual;

pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{session_id}", get(get_session))
        .route("/sessions/{session_id}/close", post(close_session))
        .route("/records", get(list_records))
        .route("/records/bulk", post(mark_bulk))
        .route("/records/{user_id}", put(mark_manual))
        .route_layer(from_fn_with_state(app_state, allow_instructor))
}
