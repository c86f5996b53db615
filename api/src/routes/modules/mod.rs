use crate::routes::modules::attendance::attendance_routes;
use crate::state::AppState;
use axum::Router;

pub mod attendance;

/// `/modules` route group. Only the attendance subtree is served here.
pub fn modules_routes(app_state: AppState) -> Router<AppState> {
    Router::new().nest("/{module_id}/attendance", attendance_routes(app_state))
}
