//! Access tokens and the holder that hands them to API clients.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::utils::now_millis;

/// Tokens are treated as expired this long before their real expiry.
const EXPIRY_SKEW_MS: u64 = 60_000;

/// One OAuth token grant. Immutable; a refresh produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (ms) after which the access token is invalid.
    pub expires_at_ms: u64,
    pub scope: Option<String>,
}

impl AccessToken {
    /// Whether the token is expired (or about to be) at `now_ms`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms + EXPIRY_SKEW_MS >= self.expires_at_ms
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

/// Holds the current token for one provider.
///
/// Readers clone the `Arc` and keep using that value even if a refresh swaps
/// in a newer one meanwhile. Nothing mutates a token in place.
#[derive(Debug, Default)]
pub struct CredentialHolder {
    current: RwLock<Option<Arc<AccessToken>>>,
}

impl CredentialHolder {
    #[must_use]
    pub fn new(initial: Option<AccessToken>) -> Self {
        Self {
            current: RwLock::new(initial.map(Arc::new)),
        }
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<AccessToken>> {
        self.current.read().clone()
    }

    /// Installs a new token and returns the shared handle to it.
    pub fn replace(&self, token: AccessToken) -> Arc<AccessToken> {
        let token = Arc::new(token);
        *self.current.write() = Some(Arc::clone(&token));
        token
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }
}
