//! OAuth login, callback and status routes.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::response::api_success;
use crate::api::AppState;
use crate::auth::Provider;
use crate::error::{RelayError, RelayResult};
use crate::protocol_constants::{AUTH_STATE_TTL_MS, MAX_PENDING_AUTH_STATES};

/// OAuth `state` values issued by the login route, awaiting their callback.
///
/// Entries expire after [`AUTH_STATE_TTL_MS`] and at most
/// [`MAX_PENDING_AUTH_STATES`] are kept.
#[derive(Debug, Default)]
pub(crate) struct PendingAuthStates {
    entries: HashMap<String, (Provider, u64)>,
}

impl PendingAuthStates {
    pub(crate) fn insert(&mut self, state: String, provider: Provider, now_ms: u64) {
        self.entries
            .retain(|_, (_, issued)| now_ms.saturating_sub(*issued) < AUTH_STATE_TTL_MS);

        while self.entries.len() >= MAX_PENDING_AUTH_STATES {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, issued))| *issued)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => self.entries.remove(&key),
                None => break,
            };
        }

        self.entries.insert(state, (provider, now_ms));
    }

    /// Removes `state`; true if it was live and issued for `provider`.
    pub(crate) fn take(&mut self, state: &str, provider: Provider, now_ms: u64) -> bool {
        match self.entries.remove(state) {
            Some((issued_for, issued)) => {
                issued_for == provider && now_ms.saturating_sub(issued) < AUTH_STATE_TTL_MS
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn parse_provider(raw: &str) -> RelayResult<Provider> {
    raw.parse()
        .map_err(|e: crate::auth::UnknownProvider| RelayError::NotFound(e.to_string()))
}

/// Redirects the browser to the provider's consent page.
pub(crate) async fn login(
    Path(provider): Path<String>,
    State(state): State<AppState>,
) -> RelayResult<impl IntoResponse> {
    let provider = parse_provider(&provider)?;
    let nonce = Uuid::new_v4().to_string();
    let url = state.session(provider).authorize_url(&nonce)?;
    state.remember_auth_state(nonce, provider);

    log::info!("[OAuth] Starting {} authorization", provider);
    Ok(Redirect::to(&url))
}

/// Completes the authorization-code flow and stores the token.
pub(crate) async fn callback(
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    State(state): State<AppState>,
) -> RelayResult<impl IntoResponse> {
    let provider = parse_provider(&provider)?;

    if let Some(error) = params.error {
        return Err(RelayError::Unauthorized(format!(
            "{} authorization denied: {}",
            provider, error
        )));
    }

    let nonce = params
        .state
        .ok_or_else(|| RelayError::InvalidRequest("missing state".into()))?;
    if !state.take_auth_state(&nonce, provider) {
        return Err(RelayError::InvalidRequest(
            "unknown or reused state parameter".into(),
        ));
    }

    let code = params
        .code
        .ok_or_else(|| RelayError::InvalidRequest("missing code".into()))?;
    state.session(provider).complete_authorization(&code).await?;

    Ok(api_success(json!({
        "provider": provider,
        "authorized": true,
    })))
}

/// Authorization state of both providers.
pub(crate) async fn auth_status(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "providers": [
            state.spotify_session.status(),
            state.sonos_session.status(),
        ]
    }))
}
