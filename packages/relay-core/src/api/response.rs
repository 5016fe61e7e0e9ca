//! Standard API response helpers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

/// Standard API success response with custom data.
pub fn api_success<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(data))
}

/// Simple success response with `{ "success": true }`.
pub fn api_ok() -> impl IntoResponse {
    api_success(json!({ "success": true }))
}

/// `202 Accepted` for an intent handed to the playback queue.
pub fn api_accepted(id: Uuid, kind: &str) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "accepted": true,
            "id": id,
            "kind": kind,
        })),
    )
}

/// Standard API error response with code and message.
pub fn api_error(
    status: StatusCode,
    code: &str,
    message: impl std::fmt::Display,
) -> impl IntoResponse {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.to_string()
        })),
    )
}
