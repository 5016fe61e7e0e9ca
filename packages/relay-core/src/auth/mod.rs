//! OAuth credentials for the Spotify Web API and the Sonos Control API.
//!
//! - `oauth` - Token endpoint calls (code exchange, refresh grant)
//! - `credentials` - Swappable holder for the current access token
//! - `token_store` - JSON persistence of tokens in the data directory
//! - `session` - Per-provider composition with refresh-and-retry
//! - `refresher` - Background periodic refresh

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod credentials;
pub mod oauth;
pub mod refresher;
pub mod session;
pub mod token_store;

pub use credentials::{AccessToken, CredentialHolder};
pub use oauth::{OAuthClient, OAuthEndpoints};
pub use refresher::TokenRefresher;
pub use session::{AuthStatus, OAuthSession};
pub use token_store::TokenStore;

/// Third-party services the relay holds OAuth tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Spotify,
    Sonos,
}

impl Provider {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::Sonos => "sonos",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a path segment names no known provider.
#[derive(Debug, Clone, Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spotify" => Ok(Self::Spotify),
            "sonos" => Ok(Self::Sonos),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Errors from token acquisition, refresh and persistence.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// HTTP request to the token endpoint or the API failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint answered with a non-success status.
    #[error("{provider} token endpoint returned {status}: {body}")]
    TokenEndpoint {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// No token has been obtained yet for this provider.
    #[error("{0} is not authorized; visit /auth/{0}/login")]
    NotAuthorized(Provider),

    /// The current token cannot be refreshed.
    #[error("{0} token has no refresh token")]
    MissingRefreshToken(Provider),

    /// Client credentials for this provider are not configured.
    #[error("{0} OAuth client is not configured")]
    NotConfigured(Provider),
}
