//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}`.
///
/// Errors use the envelope produced by `AppError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Empty payload, serialized as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// `{"success": true, "data": {}}`.
#[must_use]
pub const fn empty() -> ApiResponse<Empty> {
    ApiResponse::ok(Empty {})
}
