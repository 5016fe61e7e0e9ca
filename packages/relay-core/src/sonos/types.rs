//! Domain types for the speaker control layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol_constants::SONOS_PORT;

// ─────────────────────────────────────────────────────────────────────────────
// Speaker Address
// ─────────────────────────────────────────────────────────────────────────────

/// Network location of the target speaker.
///
/// Configured once at startup and shared read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeakerAddress {
    pub host: String,
    pub port: u16,
}

impl SpeakerAddress {
    /// Creates an address on the standard Sonos control port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_port(host, SONOS_PORT)
    }

    #[must_use]
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for SpeakerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport State
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state reported by the AVTransport service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportState {
    Playing,
    #[serde(rename = "PAUSED_PLAYBACK")]
    Paused,
    Stopped,
    Transitioning,
    NoMediaPresent,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Transitioning => write!(f, "Transitioning"),
            Self::NoMediaPresent => write!(f, "No media"),
        }
    }
}

/// Error returned when parsing an unknown transport state string.
#[derive(Debug, Clone, Error)]
#[error("unknown transport state")]
pub struct ParseTransportStateError;

impl std::str::FromStr for TransportState {
    type Err = ParseTransportStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYING" => Ok(Self::Playing),
            "PAUSED_PLAYBACK" | "PAUSED" => Ok(Self::Paused),
            "STOPPED" => Ok(Self::Stopped),
            "TRANSITIONING" => Ok(Self::Transitioning),
            "NO_MEDIA_PRESENT" => Ok(Self::NoMediaPresent),
            _ => Err(ParseTransportStateError),
        }
    }
}

/// Result of a `GetTransportInfo` call.
///
/// `raw_state` is kept verbatim for diagnostics; `state` is `None` when the
/// speaker reports a value this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportInfo {
    pub raw_state: String,
    pub state: Option<TransportState>,
    pub status: Option<String>,
}

impl TransportInfo {
    /// Builds transport info from the raw `CurrentTransportState` value.
    #[must_use]
    pub fn from_raw(raw_state: impl Into<String>, status: Option<String>) -> Self {
        let raw_state = raw_state.into();
        let state = raw_state.parse().ok();
        Self {
            raw_state,
            state,
            status,
        }
    }
}
