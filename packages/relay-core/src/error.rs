//! Centralized error types for the relay core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::OAuthError;
use crate::cloud::CloudError;
use crate::services::QueueClosed;
use crate::sonos::soap::SoapError;
use crate::sonos::uri::InvalidReferenceError;
use crate::spotify::SpotifyError;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for SoapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "speaker_unreachable",
            Self::HttpStatus(_, _) => "speaker_http_error",
            Self::Fault(_, _) => "soap_fault",
            Self::Parse(_) => "soap_parse_error",
            Self::Incomplete(_) => "soap_request_incomplete",
        }
    }
}

impl ErrorCode for OAuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "oauth_http_failed",
            Self::TokenEndpoint { .. } => "oauth_token_rejected",
            Self::NotAuthorized(_) => "not_authorized",
            Self::MissingRefreshToken(_) => "missing_refresh_token",
            Self::NotConfigured(_) => "oauth_not_configured",
        }
    }
}

impl ErrorCode for SpotifyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "spotify_http_failed",
            Self::Auth(e) => e.code(),
            Self::Status { .. } => "spotify_api_error",
        }
    }
}

impl ErrorCode for CloudError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "sonos_cloud_http_failed",
            Self::Auth(e) => e.code(),
            Self::Status { .. } => "sonos_cloud_api_error",
            Self::NoHousehold => "no_household",
            Self::GroupNotFound(_) => "group_not_found",
            Self::FavoriteNotFound(_) => "favorite_not_found",
        }
    }
}

/// Application-wide error type for the relay server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum RelayError {
    /// SOAP request to the speaker failed.
    #[error("Speaker request failed: {0}")]
    Soap(String),

    /// A track reference was not `spotify:track:<id>`.
    #[error("{0}")]
    InvalidReference(String),

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A named resource (favorite, group, provider) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No usable OAuth token for a provider.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// A third-party API (Spotify, Sonos Cloud) failed.
    #[error("Upstream API error: {0}")]
    Upstream(String),

    /// Server configuration error (missing required settings).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Soap(_) => "soap_error",
            Self::InvalidReference(_) => "invalid_reference",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Upstream(_) => "upstream_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) | Self::InvalidReference(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Soap(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::sonos::soap::SoapResult;

/// Convenient Result alias for application-wide operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<SoapError> for RelayError {
    fn from(err: SoapError) -> Self {
        Self::Soap(err.to_string())
    }
}

impl From<InvalidReferenceError> for RelayError {
    fn from(err: InvalidReferenceError) -> Self {
        Self::InvalidReference(err.to_string())
    }
}

impl From<OAuthError> for RelayError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::NotAuthorized(_) | OAuthError::MissingRefreshToken(_) => {
                Self::Unauthorized(err.to_string())
            }
            OAuthError::NotConfigured(_) => Self::Configuration(err.to_string()),
            _ => Self::Upstream(err.to_string()),
        }
    }
}

impl From<SpotifyError> for RelayError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::Auth(e) => e.into(),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<CloudError> for RelayError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::Auth(e) => e.into(),
            CloudError::NoHousehold
            | CloudError::GroupNotFound(_)
            | CloudError::FavoriteNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<QueueClosed> for RelayError {
    fn from(err: QueueClosed) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Provider;

    #[test]
    fn invalid_reference_maps_to_bad_request() {
        let err: RelayError = InvalidReferenceError("spotify:album:1".into()).into();
        assert_eq!(err.code(), "invalid_reference");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn soap_errors_map_to_bad_gateway() {
        let err: RelayError = SoapError::HttpStatus(500, "boom".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("HTTP error 500"));
    }

    #[test]
    fn missing_token_maps_to_unauthorized() {
        let err: RelayError = SpotifyError::Auth(OAuthError::NotAuthorized(Provider::Spotify)).into();
        assert_eq!(err.code(), "unauthorized");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_favorite_maps_to_not_found() {
        let err = CloudError::FavoriteNotFound("Morning".into());
        assert_eq!(err.code(), "favorite_not_found");
        let relay: RelayError = err.into();
        assert_eq!(relay.status_code(), StatusCode::NOT_FOUND);
    }
}
