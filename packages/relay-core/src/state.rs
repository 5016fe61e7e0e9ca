//! Core configuration types.
//!
//! [`Config`] is built by the server binary from YAML, environment and CLI
//! flags, then handed to [`crate::bootstrap_services`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{DEFAULT_CONTINUOUS_SETTLE_MS, SONOS_PORT};
use crate::sonos::types::SpeakerAddress;

/// Client registration for one OAuth provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct OAuthAppConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with the provider, e.g.
    /// `http://relay.local:8080/auth/spotify/callback`.
    pub redirect_uri: String,
}

impl OAuthAppConfig {
    /// Whether enough is set to run the authorization flow.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }
}

/// Configuration for the relay.
///
/// Everything except `speaker_host` has a usable default.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    // Speaker
    /// Hostname or IP of the target speaker.
    pub speaker_host: Option<String>,

    /// UPnP control port of the speaker.
    pub speaker_port: u16,

    // Server
    /// Port for the HTTP API.
    pub bind_port: u16,

    /// Directory for `tokens.json`. Tokens are memory-only when unset.
    pub data_dir: Option<PathBuf>,

    // Playback
    /// Volume applied before playback when a request gives none.
    pub default_volume: Option<u8>,

    /// Wait between starting a track and switching to its radio (ms).
    pub continuous_settle_ms: u64,

    /// Maximum candidates requested from search.
    pub search_limit: u32,

    /// Favorite played by the arrival webhook.
    pub arrival_favorite: Option<String>,

    /// Sonos group for favorites; the first group when unset.
    pub target_group: Option<String>,

    // OAuth
    /// Interval between background token refreshes (seconds).
    pub token_refresh_interval_secs: u64,

    #[serde(default)]
    pub spotify: OAuthAppConfig,

    #[serde(default)]
    pub sonos: OAuthAppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speaker_host: None,
            speaker_port: SONOS_PORT,
            bind_port: 8080,
            data_dir: None,
            default_volume: None,
            continuous_settle_ms: DEFAULT_CONTINUOUS_SETTLE_MS,
            search_limit: 20,
            arrival_favorite: None,
            target_group: None,
            token_refresh_interval_secs: 45 * 60,
            spotify: OAuthAppConfig::default(),
            sonos: OAuthAppConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.speaker_host.as_deref().map_or(true, |h| h.trim().is_empty()) {
            return Err("speaker_host is required".to_string());
        }
        if self.speaker_port == 0 {
            return Err("speaker_port must be >= 1".to_string());
        }
        if self.search_limit == 0 || self.search_limit > 50 {
            return Err("search_limit must be between 1 and 50".to_string());
        }
        if self.token_refresh_interval_secs == 0 {
            return Err("token_refresh_interval_secs must be >= 1".to_string());
        }
        if let Some(volume) = self.default_volume {
            if volume > 100 {
                return Err("default_volume must be between 0 and 100".to_string());
            }
        }
        Ok(())
    }

    /// The configured speaker, if a host is set.
    #[must_use]
    pub fn speaker_address(&self) -> Option<SpeakerAddress> {
        self.speaker_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| SpeakerAddress::with_port(h, self.speaker_port))
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.continuous_settle_ms)
    }

    #[must_use]
    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_interval_secs)
    }
}
