//! Spotify Web API collaborator: track search and pausing the Spotify app.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::OAuthError;
use crate::services::ranking::SearchCandidate;

pub mod client;

pub use client::SpotifyClient;

/// Errors from the Spotify Web API.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(OAuthError),

    #[error("Spotify API returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<OAuthError> for SpotifyError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Http(e) => Self::Http(e),
            other => Self::Auth(other),
        }
    }
}

/// Source of search candidates.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    /// Searches tracks by free text and/or field filters, in the provider's
    /// own relevance order.
    async fn search(
        &self,
        query: Option<&str>,
        artist: Option<&str>,
        track: Option<&str>,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, SpotifyError>;
}

/// Pauses whatever the streaming service is currently playing.
///
/// Implementations treat "nothing is playing" as success.
#[async_trait]
pub trait PlaybackPauser: Send + Sync {
    async fn pause_playback(&self) -> Result<(), SpotifyError>;
}
