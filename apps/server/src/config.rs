//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use relay_core::protocol_constants::{DEFAULT_CONTINUOUS_SETTLE_MS, SONOS_PORT};
use relay_core::OAuthAppConfig;
use serde::Deserialize;

/// Client credentials for one OAuth provider as written in YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OAuthSection {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthSection {
    fn to_core(&self) -> OAuthAppConfig {
        OAuthAppConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname or IP of the speaker to control.
    /// Override: `RELAY_SPEAKER_HOST`
    pub speaker_host: Option<String>,

    /// Override: `RELAY_SPEAKER_PORT`
    pub speaker_port: u16,

    /// Port to bind the HTTP server to.
    /// Override: `RELAY_BIND_PORT`
    pub bind_port: u16,

    /// Directory for persisted OAuth tokens.
    /// Override: `RELAY_DATA_DIR`
    pub data_dir: Option<PathBuf>,

    /// Override: `RELAY_DEFAULT_VOLUME`
    pub default_volume: Option<u8>,

    /// Delay between starting a track and queueing its radio, in ms.
    pub continuous_settle_ms: u64,

    pub search_limit: u32,

    /// Favorite played on arrival.
    /// Override: `RELAY_ARRIVAL_FAVORITE`
    pub arrival_favorite: Option<String>,

    /// Sonos group to play favorites on.
    /// Override: `RELAY_TARGET_GROUP`
    pub target_group: Option<String>,

    pub token_refresh_interval_secs: u64,

    /// Overrides: `RELAY_SPOTIFY_CLIENT_ID`, `RELAY_SPOTIFY_CLIENT_SECRET`,
    /// `RELAY_SPOTIFY_REDIRECT_URI`
    pub spotify: OAuthSection,

    /// Overrides: `RELAY_SONOS_CLIENT_ID`, `RELAY_SONOS_CLIENT_SECRET`,
    /// `RELAY_SONOS_REDIRECT_URI`
    pub sonos: OAuthSection,
}

impl Default for ServerConfig {
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
            spotify: OAuthSection::default(),
            sonos: OAuthSection::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `RELAY_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("RELAY_SPEAKER_HOST") {
            self.speaker_host = Some(val);
        }

        if let Some(port) = lookup("RELAY_SPEAKER_PORT").and_then(|v| v.parse().ok()) {
            self.speaker_port = port;
        }

        if let Some(port) = lookup("RELAY_BIND_PORT").and_then(|v| v.parse().ok()) {
            self.bind_port = port;
        }

        if let Some(volume) = lookup("RELAY_DEFAULT_VOLUME").and_then(|v| v.parse().ok()) {
            self.default_volume = Some(volume);
        }

        if let Some(val) = lookup("RELAY_ARRIVAL_FAVORITE") {
            self.arrival_favorite = Some(val);
        }

        if let Some(val) = lookup("RELAY_TARGET_GROUP") {
            self.target_group = Some(val);
        }

        for (prefix, section) in [("SPOTIFY", &mut self.spotify), ("SONOS", &mut self.sonos)] {
            if let Some(val) = lookup(&format!("RELAY_{prefix}_CLIENT_ID")) {
                section.client_id = val;
            }
            if let Some(val) = lookup(&format!("RELAY_{prefix}_CLIENT_SECRET")) {
                section.client_secret = val;
            }
            if let Some(val) = lookup(&format!("RELAY_{prefix}_REDIRECT_URI")) {
                section.redirect_uri = val;
            }
        }

        // RELAY_DATA_DIR is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to relay-core's Config type.
    pub fn to_core_config(&self) -> relay_core::Config {
        relay_core::Config {
            speaker_host: self.speaker_host.clone(),
            speaker_port: self.speaker_port,
            bind_port: self.bind_port,
            data_dir: self.data_dir.clone(),
            default_volume: self.default_volume,
            continuous_settle_ms: self.continuous_settle_ms,
            search_limit: self.search_limit,
            arrival_favorite: self.arrival_favorite.clone(),
            target_group: self.target_group.clone(),
            token_refresh_interval_secs: self.token_refresh_interval_secs,
            spotify: self.spotify.to_core(),
            sonos: self.sonos.to_core(),
        }
    }
}
