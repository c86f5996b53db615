use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use db::models::attendance_record::Model as AttendanceRecord;
use services::session_manager::SessionSummary;

use super::common::{RecordQuery, RosterEntry};
use crate::response::ApiResponse;
use crate::routes::common::ApiResult;
use crate::state::AppState;

/// GET `/api/modules/{module_id}/attendance/sessions`
///
/// Every session of the module, newest first, with state and attended count.
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
) -> ApiResult<Vec<SessionSummary>> {
    let sessions = state
        .sessions()
        .list_for_module(module_id, Utc::now())
        .await?;

    Ok(ApiResponse::success(sessions, "Attendance sessions retrieved").with_status(StatusCode::OK))
}

/// GET `/api/modules/{module_id}/attendance/sessions/{session_id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path((module_id, session_id)): Path<(i64, i64)>,
) -> ApiResult<SessionSummary> {
    let summary = state
        .sessions()
        .get(module_id, session_id, Utc::now())
        .await?;

    Ok(ApiResponse::success(summary, "Attendance session retrieved").with_status(StatusCode::OK))
}

/// GET `/api/modules/{module_id}/attendance/records?date=YYYY-MM-DD`
///
/// Day roster; `date` defaults to today (UTC).
pub async fn list_records(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
    Query(q): Query<RecordQuery>,
) -> ApiResult<Vec<RosterEntry>> {
    let date = q.date.unwrap_or_else(|| Utc::now().date_naive());
    let records = AttendanceRecord::list_for_module_day(state.db(), module_id, date)
        .await
        .map_err(services::AttendanceError::from)?;

    let roster: Vec<RosterEntry> = records.into_iter().map(RosterEntry::from).collect();
    Ok(ApiResponse::success(roster, "Attendance records retrieved").with_status(StatusCode::OK))
}
