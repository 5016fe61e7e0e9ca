//! Search, pick the best match and play it.

use std::sync::Arc;

use serde::Serialize;

use crate::protocol_constants::MAX_ALTERNATIVES;
use crate::services::ranking::{rank, SearchCandidate};
use crate::services::track_playback::{PlaybackOutcome, TrackPlayer};
use crate::sonos::uri::TrackReference;
use crate::spotify::{PlaybackPauser, SpotifyError, TrackSearch};
use crate::utils::non_blank;

/// Error text for a search that produced no playable candidate.
pub const NO_MATCH_ERROR: &str = "No matching tracks found";

/// The request as received, echoed back in results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTerms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

impl SearchTerms {
    #[must_use]
    pub fn new(query: Option<&str>, artist: Option<&str>, track: Option<&str>) -> Self {
        Self {
            query: non_blank(query).map(str::to_string),
            artist: non_blank(artist).map(str::to_string),
            track: non_blank(track).map(str::to_string),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.artist.is_none() && self.track.is_none()
    }
}

/// Public view of a ranked track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub reference: TrackReference,
    pub popularity: u8,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

impl From<&SearchCandidate> for TrackSummary {
    fn from(c: &SearchCandidate) -> Self {
        Self {
            name: c.name.clone(),
            artist: c.artist.clone(),
            album: c.album.clone(),
            reference: c.reference.clone(),
            popularity: c.popularity,
            score: c.score,
            artwork: c.artwork.clone(),
        }
    }
}

/// Outcome of a search-and-play request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPlayResult {
    pub success: bool,
    pub query: SearchTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<TrackSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchPlayResult {
    fn failed(query: SearchTerms, error: String) -> Self {
        Self {
            success: false,
            query,
            track: None,
            alternatives: Vec::new(),
            playback: None,
            error: Some(error),
        }
    }
}

/// Glues search, ranking and track playback together.
#[derive(Clone)]
pub struct SearchPlayer {
    search: Arc<dyn TrackSearch>,
    pauser: Option<Arc<dyn PlaybackPauser>>,
    player: TrackPlayer,
    limit: u32,
}

impl SearchPlayer {
    pub fn new(
        search: Arc<dyn TrackSearch>,
        pauser: Option<Arc<dyn PlaybackPauser>>,
        player: TrackPlayer,
        limit: u32,
    ) -> Self {
        Self {
            search,
            pauser,
            player,
            limit,
        }
    }

    #[must_use]
    pub fn player(&self) -> &TrackPlayer {
        &self.player
    }

    /// Searches and ranks without playing anything.
    pub async fn search(&self, terms: &SearchTerms) -> Result<Vec<SearchCandidate>, SpotifyError> {
        let candidates = self
            .search
            .search(
                terms.query.as_deref(),
                terms.artist.as_deref(),
                terms.track.as_deref(),
                self.limit,
            )
            .await?;
        Ok(rank(
            candidates,
            terms.query.as_deref(),
            terms.artist.as_deref(),
            terms.track.as_deref(),
        ))
    }

    /// Pauses the streaming app so it does not fight the speaker for the
    /// account's playback session. Failures are logged and ignored.
    pub async fn pause_source(&self) {
        if let Some(pauser) = &self.pauser {
            if let Err(e) = pauser.pause_playback().await {
                log::warn!("[Search] Could not pause Spotify, continuing: {}", e);
            }
        }
    }

    /// Finds the best match for `terms` and plays it.
    ///
    /// No match is an ordinary unsuccessful result, and the speaker is not
    /// touched.
    pub async fn search_and_play(
        &self,
        terms: SearchTerms,
        continuous: bool,
        volume: Option<u8>,
    ) -> SearchPlayResult {
        let ranked = match self.search(&terms).await {
            Ok(ranked) => ranked,
            Err(e) => {
                log::warn!("[Search] Search failed for {:?}: {}", terms, e);
                return SearchPlayResult::failed(terms, e.to_string());
            }
        };

        let Some(best) = ranked.first() else {
            log::info!("[Search] No match for {:?}", terms);
            return SearchPlayResult::failed(terms, NO_MATCH_ERROR.to_string());
        };

        log::info!(
            "[Search] Best match: {} - {} (score {:.1})",
            best.artist,
            best.name,
            best.score
        );

        self.pause_source().await;

        let metadata = best.to_metadata();
        let playback = if continuous {
            self.player
                .play_track_with_continuous_mode(&best.reference, &metadata, volume)
                .await
        } else {
            self.player
                .play_track(&best.reference, &metadata, volume)
                .await
        };

        let alternatives = ranked
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(TrackSummary::from)
            .collect();

        SearchPlayResult {
            success: playback.success,
            query: terms,
            track: Some(TrackSummary::from(best)),
            alternatives,
            error: playback.error.clone(),
            playback: Some(playback),
        }
    }
}
