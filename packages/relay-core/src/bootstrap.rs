//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::{OAuthClient, OAuthEndpoints, OAuthSession, Provider, TokenRefresher, TokenStore};
use crate::cloud::{CloudFavorites, SonosCloudClient};
use crate::error::{RelayError, RelayResult};
use crate::protocol_constants::CLOUD_TIMEOUT_SECS;
use crate::services::{FavoritePlayer, PlaybackExecutor, PlaybackQueue, SearchPlayer, TrackPlayer};
use crate::sonos::{SpeakerClient, SpeakerControl};
use crate::spotify::{PlaybackPauser, SpotifyClient, TrackSearch};
use crate::state::{Config, OAuthAppConfig};

/// Container for all bootstrapped services.
///
/// Consumed by `AppState` to build the HTTP layer's shared state.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Validated configuration.
    pub config: Arc<Config>,
    /// The one speaker this relay controls.
    pub speaker: Arc<dyn SpeakerControl>,
    /// Spotify OAuth session (search, pause).
    pub spotify_session: Arc<OAuthSession>,
    /// Sonos Control API OAuth session (favorites).
    pub sonos_session: Arc<OAuthSession>,
    /// Search, rank and play.
    pub search_player: SearchPlayer,
    /// Named favorites via the cloud API.
    pub favorite_player: FavoritePlayer,
    /// Serialized playback worker.
    pub queue: PlaybackQueue,
    /// Shared HTTP client for connection pooling.
    http_client: Client,
    /// Background tasks awaited on shutdown.
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
}

impl BootstrappedServices {
    /// Returns the shared HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Returns the session for `provider`.
    #[must_use]
    pub fn session(&self, provider: Provider) -> &Arc<OAuthSession> {
        match provider {
            Provider::Spotify => &self.spotify_session,
            Provider::Sonos => &self.sonos_session,
        }
    }

    /// Initiates graceful shutdown of all services.
    ///
    /// The playback worker finishes the intent it is running; queued ones
    /// are dropped.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        self.cancel_token.cancel();

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                log::warn!("[Bootstrap] Background task ended abnormally: {}", e);
            }
        }

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for speaker and cloud communication.
///
/// SOAP requests set their own shorter per-request timeout.
fn create_http_client() -> RelayResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(CLOUD_TIMEOUT_SECS))
        .build()
        .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))
}

fn create_session(
    provider: Provider,
    app: &OAuthAppConfig,
    http: &Client,
    store: &TokenStore,
) -> Arc<OAuthSession> {
    let client = if app.is_complete() {
        Some(OAuthClient::new(
            http.clone(),
            provider,
            app.clone(),
            OAuthEndpoints::for_provider(provider),
        ))
    } else {
        log::warn!(
            "[Bootstrap] {} OAuth client not configured; its features are unavailable",
            provider
        );
        None
    };
    Arc::new(OAuthSession::new(provider, client, store.clone()))
}

/// Bootstraps all application services with their dependencies.
///
/// Wiring order:
///
/// 1. Shared infrastructure (HTTP client, cancellation token, token store)
/// 2. OAuth sessions and the background token refresher
/// 3. Protocol clients (speaker, Spotify, Sonos Cloud)
/// 4. Playback services and the queue worker
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `RelayError::Configuration` if the configuration is invalid.
pub fn bootstrap_services(config: Config) -> RelayResult<BootstrappedServices> {
    config.validate().map_err(RelayError::Configuration)?;
    let speaker_address = config
        .speaker_address()
        .ok_or_else(|| RelayError::Configuration("speaker_host is required".into()))?;

    let http_client = create_http_client()?;
    let cancel_token = CancellationToken::new();

    let store = TokenStore::new(config.data_dir.clone());
    if !store.is_persistent() {
        log::warn!("[Bootstrap] No data_dir configured; tokens will not survive restarts");
    }

    let spotify_session = create_session(Provider::Spotify, &config.spotify, &http_client, &store);
    let sonos_session = create_session(Provider::Sonos, &config.sonos, &http_client, &store);

    let refresher = TokenRefresher::new(
        vec![Arc::clone(&spotify_session), Arc::clone(&sonos_session)],
        config.token_refresh_interval(),
    );
    let refresher_task = refresher.spawn(cancel_token.clone());

    log::info!("[Bootstrap] Target speaker: {}", speaker_address);
    let speaker: Arc<dyn SpeakerControl> =
        Arc::new(SpeakerClient::new(http_client.clone(), speaker_address));

    let spotify = Arc::new(SpotifyClient::new(
        http_client.clone(),
        Arc::clone(&spotify_session),
    ));
    let cloud = Arc::new(SonosCloudClient::new(
        http_client.clone(),
        Arc::clone(&sonos_session),
    ));

    let track_player = TrackPlayer::new(Arc::clone(&speaker), config.settle_delay());
    let search_player = SearchPlayer::new(
        Arc::clone(&spotify) as Arc<dyn TrackSearch>,
        Some(Arc::clone(&spotify) as Arc<dyn PlaybackPauser>),
        track_player,
        config.search_limit,
    );
    let favorite_player = FavoritePlayer::new(
        cloud as Arc<dyn CloudFavorites>,
        Some(spotify as Arc<dyn PlaybackPauser>),
        config.target_group.clone(),
    );

    let (queue, worker_task) = PlaybackQueue::start(
        PlaybackExecutor::new(favorite_player.clone(), search_player.clone()),
        cancel_token.clone(),
    );

    Ok(BootstrappedServices {
        config: Arc::new(config),
        speaker,
        spotify_session,
        sonos_session,
        search_player,
        favorite_player,
        queue,
        http_client,
        tasks: Arc::new(Mutex::new(vec![refresher_task, worker_task])),
        cancel_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_builds() {
        let client = create_http_client().unwrap();
        assert!(client.get("http://example.com").build().is_ok());
    }

    #[tokio::test]
    async fn missing_speaker_host_is_a_configuration_error() {
        let err = bootstrap_services(Config::default()).err().unwrap();
        assert_eq!(err.code(), "configuration_error");
    }

    #[tokio::test]
    async fn bootstraps_and_shuts_down() {
        let config = Config {
            speaker_host: Some("127.0.0.1".into()),
            ..Config::default()
        };
        let services = bootstrap_services(config).unwrap();
        assert!(!services.session(Provider::Spotify).is_configured());

        services.shutdown().await;
        assert!(services.cancel_token.is_cancelled());
    }
}
