use axum::{Extension, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use services::verifier::{CheckInAttempt, CheckInReceipt};
use validator::Validate;

use crate::auth::{AuthUser, extractors::ClientOrigin};
use crate::response::ApiResponse;
use crate::routes::common::{ApiResult, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInReq {
    #[validate(length(min = 1, max = 32, message = "code must be 1-32 characters"))]
    pub code: String,
}

/// POST `/api/attendance/check-in`
///
/// Self-check-in with a session code. The caller's origin comes from the
/// connection, never from the body.
///
/// **Responses**: `200` with a `CheckInReceipt`; on failure the body's
/// `data.kind` names the check that failed (`invalid_or_expired_session` 410,
/// `origin_mismatch` 403, `device_already_used` 409, `not_enrolled` 403,
/// `malformed_input` 400, `storage_unavailable` 503).
pub async fn check_in(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ClientOrigin(origin): ClientOrigin,
    ValidJson(body): ValidJson<CheckInReq>,
) -> ApiResult<CheckInReceipt> {
    let receipt = state
        .verifier()
        .attempt(
            CheckInAttempt {
                code: body.code,
                user_id: claims.sub,
                origin: origin.unwrap_or_default(),
            },
            Utc::now(),
        )
        .await?;

    Ok(ApiResponse::success(receipt, "Attendance recorded").with_status(StatusCode::OK))
}
