//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to services.
//! It provides the router construction and server startup functionality.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::api::oauth::PendingAuthStates;
use crate::auth::{OAuthSession, Provider};
use crate::bootstrap::BootstrappedServices;
use crate::services::{FavoritePlayer, PlaybackQueue, SearchPlayer};
use crate::sonos::SpeakerControl;
use crate::state::Config;
use crate::utils::now_millis;

pub mod http;
pub mod oauth;
pub mod response;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds references to services.
/// All business logic lives in the services themselves.
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration.
    pub config: Arc<Config>,
    /// The controlled speaker.
    pub speaker: Arc<dyn SpeakerControl>,
    /// Spotify OAuth session.
    pub spotify_session: Arc<OAuthSession>,
    /// Sonos Control API OAuth session.
    pub sonos_session: Arc<OAuthSession>,
    /// Search without playing (`/api/search`).
    pub search_player: SearchPlayer,
    /// Favorite listing (`/api/favorites`).
    pub favorite_player: FavoritePlayer,
    /// Playback intents go through here.
    pub queue: PlaybackQueue,
    /// OAuth `state` values issued by the login route, awaiting callback.
    pending_auth: Arc<Mutex<PendingAuthStates>>,
}

impl AppState {
    /// Builds the API state from bootstrapped services.
    pub fn new(services: &BootstrappedServices) -> Self {
        Self {
            config: Arc::clone(&services.config),
            speaker: Arc::clone(&services.speaker),
            spotify_session: Arc::clone(&services.spotify_session),
            sonos_session: Arc::clone(&services.sonos_session),
            search_player: services.search_player.clone(),
            favorite_player: services.favorite_player.clone(),
            queue: services.queue.clone(),
            pending_auth: Arc::new(Mutex::new(PendingAuthStates::default())),
        }
    }

    #[must_use]
    pub fn session(&self, provider: Provider) -> &Arc<OAuthSession> {
        match provider {
            Provider::Spotify => &self.spotify_session,
            Provider::Sonos => &self.sonos_session,
        }
    }

    /// Records an issued OAuth `state` value.
    pub(crate) fn remember_auth_state(&self, state: String, provider: Provider) {
        self.pending_auth.lock().insert(state, provider, now_millis());
    }

    /// Consumes an OAuth `state` value. True only if it was issued for
    /// `provider` and not used before.
    pub(crate) fn take_auth_state(&self, state: &str, provider: Provider) -> bool {
        self.pending_auth.lock().take(state, provider, now_millis())
    }
}

/// Starts the HTTP server on the configured port.
///
/// Returns once `shutdown` resolves and in-flight requests have finished.
pub async fn start_server<F>(state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let port = state.config.bind_port;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Server listening on http://0.0.0.0:{}", port);
    let app = http::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
