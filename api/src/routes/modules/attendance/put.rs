use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use db::models::attendance_record::{ManualMark, Model as AttendanceRecord};

use super::common::ManualMarkReq;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{ApiResult, ValidJson};
use crate::state::AppState;

/// PUT `/api/modules/{module_id}/attendance/records/{user_id}`
///
/// Sets one student's mark for a day, overwriting any earlier one.
///
/// **Body**: `{ "date": "YYYY-MM-DD", "status": "present" | "absent" | "late" | "excused", "remarks"? }`
pub async fn mark_manual(
    State(state): State<AppState>,
    Path((module_id, user_id)): Path<(i64, i64)>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidJson(body): ValidJson<ManualMarkReq>,
) -> ApiResult<AttendanceRecord> {
    let record = state
        .marker()
        .mark_manual(
            ManualMark {
                user_id,
                module_id,
                date: body.date,
                status: body.status,
                marked_by: claims.sub,
                remarks: body.remarks,
            },
            Utc::now(),
        )
        .await?;

    Ok(ApiResponse::success(record, "Attendance marked").with_status(StatusCode::OK))
}
