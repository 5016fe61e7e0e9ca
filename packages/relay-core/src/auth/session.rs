//! Per-provider OAuth session: current token, refresh and persistence.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tokio::sync::Mutex;

use super::credentials::{AccessToken, CredentialHolder};
use super::oauth::OAuthClient;
use super::token_store::TokenStore;
use super::{OAuthError, Provider};

/// Authorization state of one provider, as reported by `/auth/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub provider: Provider,
    pub configured: bool,
    pub authorized: bool,
    pub expires_at_ms: Option<u64>,
}

/// Owns the token for one provider and keeps it fresh.
///
/// API clients never hold a token themselves; they go through
/// [`OAuthSession::send_authorized`], which injects the current token and
/// refreshes once on a 401.
pub struct OAuthSession {
    provider: Provider,
    client: Option<OAuthClient>,
    holder: CredentialHolder,
    store: TokenStore,
    /// Serializes refreshes so concurrent 401s trigger one token call.
    refresh_lock: Mutex<()>,
}

impl OAuthSession {
    /// Creates a session, restoring any persisted token.
    ///
    /// `client` is `None` when the provider has no client credentials
    /// configured; such a session can only report its status.
    #[must_use]
    pub fn new(provider: Provider, client: Option<OAuthClient>, store: TokenStore) -> Self {
        let initial = store.load(provider);
        if initial.is_some() {
            log::info!("[OAuth] Restored {} token from disk", provider);
        }
        Self {
            provider,
            client,
            holder: CredentialHolder::new(initial),
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&OAuthClient, OAuthError> {
        self.client
            .as_ref()
            .ok_or(OAuthError::NotConfigured(self.provider))
    }

    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(self.client()?.authorize_url(state))
    }

    /// Exchanges the callback code and installs the resulting token.
    ///
    /// A token that cannot be written to disk is still used for this
    /// process lifetime.
    pub async fn complete_authorization(&self, code: &str) -> Result<(), OAuthError> {
        let token = self.client()?.exchange_code(code).await?;
        self.install(token);
        Ok(())
    }

    /// Returns a usable token, refreshing first if it has expired.
    pub async fn access_token(&self) -> Result<Arc<AccessToken>, OAuthError> {
        let current = self
            .holder
            .current()
            .ok_or(OAuthError::NotAuthorized(self.provider))?;
        if current.is_expired() {
            return self.refresh_from(&current).await;
        }
        Ok(current)
    }

    /// Refreshes the current token unconditionally.
    pub async fn refresh(&self) -> Result<Arc<AccessToken>, OAuthError> {
        let current = self
            .holder
            .current()
            .ok_or(OAuthError::NotAuthorized(self.provider))?;
        self.refresh_from(&current).await
    }

    /// Refreshes `stale` unless another task already replaced it.
    async fn refresh_from(&self, stale: &Arc<AccessToken>) -> Result<Arc<AccessToken>, OAuthError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.holder.current() {
            if !Arc::ptr_eq(&current, stale) {
                return Ok(current);
            }
        }

        let token = self.client()?.refresh(stale).await?;
        Ok(self.install(token))
    }

    /// Persists `token`, then swaps it into the holder.
    fn install(&self, token: AccessToken) -> Arc<AccessToken> {
        if let Err(e) = self.store.save(self.provider, &token) {
            log::warn!("[OAuth] Failed to persist {} token: {}", self.provider, e);
        }
        self.holder.replace(token)
    }

    /// Sends a request built by `build` with the current bearer token.
    ///
    /// A 401 answer triggers one refresh and one retry; any other status is
    /// returned to the caller as is.
    pub async fn send_authorized<F>(&self, build: F) -> Result<Response, OAuthError>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.access_token().await?;
        let response = build().bearer_auth(&token.access_token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::info!("[OAuth] {} returned 401, refreshing token", self.provider);
        let token = self.refresh_from(&token).await?;
        Ok(build().bearer_auth(&token.access_token).send().await?)
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        let current = self.holder.current();
        AuthStatus {
            provider: self.provider,
            configured: self.is_configured(),
            authorized: current.is_some(),
            expires_at_ms: current.map(|t| t.expires_at_ms),
        }
    }
}
