//! Spotify track references and their Sonos transport URIs.
//!
//! The speaker addresses Spotify content through its own `x-sonos-spotify:`
//! scheme, wrapping the percent-encoded Spotify URI and the account
//! parameters registered for the service on that speaker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol_constants::{
    SONOS_SPOTIFY_PARAMS, SONOS_SPOTIFY_SCHEME, SPOTIFY_TRACK_PREFIX, SPOTIFY_TRACK_RADIO_PREFIX,
};

/// A string that is not a `spotify:track:<id>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Spotify track reference: {0:?} (expected spotify:track:<id>)")]
pub struct InvalidReferenceError(pub String);

/// A validated reference to a single Spotify track.
///
/// Always of the form `spotify:track:<id>` with a non-empty ASCII
/// alphanumeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackReference {
    id: String,
}

impl TrackReference {
    /// Parses and validates a track reference.
    ///
    /// # Errors
    /// Returns `InvalidReferenceError` for anything but `spotify:track:<alnum>`.
    pub fn parse(reference: &str) -> Result<Self, InvalidReferenceError> {
        let id = reference
            .strip_prefix(SPOTIFY_TRACK_PREFIX)
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or_else(|| InvalidReferenceError(reference.to_string()))?;

        Ok(Self { id: id.to_string() })
    }

    /// Builds a reference from a bare Spotify track id.
    ///
    /// # Errors
    /// Returns `InvalidReferenceError` if the id is empty or not alphanumeric.
    pub fn from_id(id: &str) -> Result<Self, InvalidReferenceError> {
        Self::parse(&format!("{}{}", SPOTIFY_TRACK_PREFIX, id))
    }

    /// The bare track id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The reference seeding the speaker's track radio for this track.
    #[must_use]
    pub fn radio_reference(&self) -> String {
        format!("{}{}", SPOTIFY_TRACK_RADIO_PREFIX, self.id)
    }

    /// URI that makes the speaker play exactly this track.
    #[must_use]
    pub fn to_playable_uri(&self) -> String {
        sonos_spotify_uri(&self.to_string())
    }

    /// URI that makes the speaker play continuous similar tracks seeded by
    /// this one.
    #[must_use]
    pub fn to_radio_uri(&self) -> String {
        sonos_spotify_uri(&self.radio_reference())
    }
}

impl fmt::Display for TrackReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SPOTIFY_TRACK_PREFIX, self.id)
    }
}

impl FromStr for TrackReference {
    type Err = InvalidReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TrackReference {
    type Error = InvalidReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackReference> for String {
    fn from(value: TrackReference) -> Self {
        value.to_string()
    }
}

/// Wraps any Spotify URI in the speaker's `x-sonos-spotify:` scheme.
///
/// No validation happens here; callers pass validated references, while the
/// DIDL-Lite builder uses this for whatever it was handed.
#[must_use]
pub fn sonos_spotify_uri(spotify_uri: &str) -> String {
    format!(
        "{}{}?{}",
        SONOS_SPOTIFY_SCHEME,
        urlencoding::encode(spotify_uri),
        SONOS_SPOTIFY_PARAMS
    )
}

/// Converts a raw reference string into the speaker's playable URI.
///
/// # Errors
/// Returns `InvalidReferenceError` if `reference` is not `spotify:track:<id>`.
pub fn to_playable_uri(reference: &str) -> Result<String, InvalidReferenceError> {
    TrackReference::parse(reference).map(|r| r.to_playable_uri())
}

/// Converts a raw reference string into the speaker's track-radio URI.
///
/// # Errors
/// Returns `InvalidReferenceError` if `reference` is not `spotify:track:<id>`.
pub fn to_radio_uri(reference: &str) -> Result<String, InvalidReferenceError> {
    TrackReference::parse(reference).map(|r| r.to_radio_uri())
}
