//! Shared helpers for attendance handlers: error mapping and validation.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use services::AttendanceError;
use validator::{Validate, ValidationErrors};

use crate::response::ApiResponse;

/// Payload of every failed attendance call.
#[derive(Debug, Serialize, Default)]
pub struct ErrorBody {
    pub kind: &'static str,
}

/// Transport wrapper so handlers can use `?` on engine results.
#[derive(Debug)]
pub struct ApiError(pub AttendanceError);

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &AttendanceError) -> StatusCode {
    match err {
        AttendanceError::InvalidOrExpiredSession => StatusCode::GONE,
        AttendanceError::OriginMismatch => StatusCode::FORBIDDEN,
        AttendanceError::DeviceAlreadyUsed => StatusCode::CONFLICT,
        AttendanceError::NotEnrolled => StatusCode::FORBIDDEN,
        AttendanceError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AttendanceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        AttendanceError::NotFound => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        // Storage details stay in the log.
        if let AttendanceError::StorageUnavailable(source) = &self.0 {
            tracing::error!(error = %source, "Attendance storage error");
        }
        let body = ApiResponse::failure(ErrorBody { kind: self.0.kind() }, self.0.to_string());
        body.with_status(status).into_response()
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs `validator` checks, mapping failures to `MalformedInput`.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|e| ApiError(AttendanceError::MalformedInput(format_validation_errors(&e))))
}

/// Undecodable bodies (missing fields, bad dates, wrong content type) are
/// malformed input like any other.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AttendanceError::MalformedInput(rejection.body_text()))
    }
}

/// JSON body that has been decoded and passed its `validator` rules.
///
/// Every failure is rejected as `malformed_input` (400).
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await?;
        validate_body(&body)?;
        Ok(Self(body))
    }
}
