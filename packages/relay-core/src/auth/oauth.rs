//! OAuth 2.0 authorization-code flow against a provider's token endpoint.

use reqwest::Client;
use serde::Deserialize;

use super::credentials::AccessToken;
use super::{OAuthError, Provider};
use crate::protocol_constants::{
    SONOS_LOGIN_BASE, SONOS_SCOPES, SPOTIFY_ACCOUNTS_BASE, SPOTIFY_SCOPES,
};
use crate::state::OAuthAppConfig;
use crate::utils::now_millis;

/// Where a provider's consent page and token endpoint live.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub scopes: String,
}

impl OAuthEndpoints {
    /// Production endpoints for `provider`.
    #[must_use]
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Spotify => Self {
                authorize_url: format!("{SPOTIFY_ACCOUNTS_BASE}/authorize"),
                token_url: format!("{SPOTIFY_ACCOUNTS_BASE}/api/token"),
                scopes: SPOTIFY_SCOPES.to_string(),
            },
            Provider::Sonos => Self {
                authorize_url: SONOS_LOGIN_BASE.to_string(),
                token_url: format!("{SONOS_LOGIN_BASE}/access"),
                scopes: SONOS_SCOPES.to_string(),
            },
        }
    }
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<&str>) -> AccessToken {
        AccessToken {
            access_token: self.access_token,
            // Refresh grants may omit the refresh token; the old one stays valid.
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at_ms: now_millis() + self.expires_in * 1000,
            scope: self.scope,
        }
    }
}

/// Token endpoint client for one provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    provider: Provider,
    app: OAuthAppConfig,
    endpoints: OAuthEndpoints,
}

impl OAuthClient {
    #[must_use]
    pub fn new(
        http: Client,
        provider: Provider,
        app: OAuthAppConfig,
        endpoints: OAuthEndpoints,
    ) -> Self {
        Self {
            http,
            provider,
            app,
            endpoints,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Builds the consent page URL the user is redirected to.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.app.client_id),
            urlencoding::encode(&self.app.redirect_uri),
            urlencoding::encode(&self.endpoints.scopes),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.app.redirect_uri.as_str()),
        ];
        let response = self.post_token(&form).await?;
        log::info!("[OAuth] Authorized {}", self.provider);
        Ok(response.into_token(None))
    }

    /// Runs the refresh-token grant for `current`.
    pub async fn refresh(&self, current: &AccessToken) -> Result<AccessToken, OAuthError> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::MissingRefreshToken(self.provider))?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.post_token(&form).await?;
        log::debug!("[OAuth] Refreshed {} token", self.provider);
        Ok(response.into_token(Some(refresh_token)))
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, OAuthError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .basic_auth(&self.app.client_id, Some(&self.app.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!(
                "[OAuth] {} token endpoint returned {}: {}",
                self.provider,
                status,
                body
            );
            return Err(OAuthError::TokenEndpoint {
                provider: self.provider,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(
            Client::new(),
            Provider::Spotify,
            OAuthAppConfig {
                client_id: "abc".into(),
                client_secret: "secret".into(),
                redirect_uri: "http://localhost:8080/auth/spotify/callback".into(),
            },
            OAuthEndpoints::for_provider(Provider::Spotify),
        )
    }

    #[test]
    fn authorize_url_encodes_parameters() {
        let url = client().authorize_url("xyz");
        assert!(url.starts_with("https://accounts.spotify.com/authorize?client_id=abc"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fspotify%2Fcallback"
        ));
        assert!(url.contains("&state=xyz"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn refresh_keeps_previous_refresh_token_when_omitted() {
        let response = TokenResponse {
            access_token: "new".into(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        };
        let token = response.into_token(Some("keep-me"));
        assert_eq!(token.refresh_token.as_deref(), Some("keep-me"));
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_fast() {
        let token = AccessToken {
            access_token: "a".into(),
            refresh_token: None,
            expires_at_ms: 0,
            scope: None,
        };
        let err = client().refresh(&token).await.unwrap_err();
        assert!(matches!(
            err,
            OAuthError::MissingRefreshToken(Provider::Spotify)
        ));
    }
}
