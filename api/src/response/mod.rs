//! JSON envelope shared by every endpoint: `{ success, data, message }`.
//!
//! Failures reuse the same envelope; attendance failures carry their stable
//! `kind` in `data` so clients never have to parse `message`.

use axum::{Json, http::StatusCode};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn build(success: bool, data: T, message: impl Into<String>) -> Self {
        let message = message.into();
        Self { success, data, message }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(true, data, message)
    }

    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self::build(false, data, message)
    }

    /// Failure with an empty payload.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self::build(false, T::default(), message)
    }

    /// Pairs the envelope with a status, ready to be returned from a handler.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}
