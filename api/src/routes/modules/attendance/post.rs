use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use db::models::attendance_session::Model as AttendanceSession;
use services::marking::BulkMarkOutcome;

use super::common::{BulkMarkReq, CreateSessionReq};
use crate::auth::{AuthUser, extractors::ClientOrigin, guards::has_admin_capability};
use crate::response::ApiResponse;
use crate::routes::common::{ApiResult, ValidJson};
use crate::state::AppState;

/// POST `/api/modules/{module_id}/attendance/sessions`
///
/// Opens a session bound to the caller's network origin.
///
/// **Body**: `{ "title"?, "origin_policy"?: "none" | "exact" | "subnet", "window_minutes"? }`
///
/// **Responses**: `201` with the session (code and `expires_at` included);
/// `400` when a binding policy cannot be applied to the caller's origin.
pub async fn create_session(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ClientOrigin(origin): ClientOrigin,
    ValidJson(body): ValidJson<CreateSessionReq>,
) -> ApiResult<AttendanceSession> {
    let session = state
        .sessions()
        .open(module_id, claims.sub, origin.as_deref(), body.into(), Utc::now())
        .await?;

    Ok(ApiResponse::success(session, "Attendance session created").with_status(StatusCode::CREATED))
}

/// POST `/api/modules/{module_id}/attendance/sessions/{session_id}/close`
///
/// Owner or admin only; other instructors get `404`. Idempotent.
pub async fn close_session(
    State(state): State<AppState>,
    Path((module_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<AttendanceSession> {
    let session = state
        .sessions()
        .close(
            module_id,
            session_id,
            user.id(),
            has_admin_capability(&user),
            Utc::now(),
        )
        .await?;

    Ok(ApiResponse::success(session, "Attendance session closed").with_status(StatusCode::OK))
}

/// POST `/api/modules/{module_id}/attendance/records/bulk`
///
/// **Body**: `{ "date": "YYYY-MM-DD", "entries": [{ "user_id", "status", "remarks"? }] }`
///
/// Unenrolled users come back in `errors`; everything else is stored in one
/// transaction.
pub async fn mark_bulk(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidJson(body): ValidJson<BulkMarkReq>,
) -> ApiResult<BulkMarkOutcome> {
    let outcome = state
        .marker()
        .mark_bulk(module_id, body.date, body.entries, claims.sub, Utc::now())
        .await?;

    let message = format!("Marked {} student(s)", outcome.marked_count);
    Ok(ApiResponse::success(outcome, message).with_status(StatusCode::OK))
}
