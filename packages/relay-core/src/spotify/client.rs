//! HTTP client for the Spotify Web API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{PlaybackPauser, SpotifyError, TrackSearch};
use crate::auth::OAuthSession;
use crate::protocol_constants::SPOTIFY_API_BASE;
use crate::services::ranking::SearchCandidate;
use crate::sonos::uri::TrackReference;
use crate::utils::non_blank;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    /// Spotify occasionally returns `null` entries here.
    #[serde(default)]
    items: Vec<Option<TrackItem>>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    name: String,
    uri: String,
    #[serde(default)]
    popularity: u8,
    #[serde(default)]
    artists: Vec<ArtistItem>,
    album: Option<AlbumItem>,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumItem {
    name: String,
    #[serde(default)]
    images: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    url: String,
}

impl TrackItem {
    /// Converts to a candidate; local files and episodes have no track
    /// reference and are dropped.
    fn into_candidate(self) -> Option<SearchCandidate> {
        let reference = match TrackReference::parse(&self.uri) {
            Ok(r) => r,
            Err(_) => {
                log::debug!("[Spotify] Skipping non-track result {}", self.uri);
                return None;
            }
        };
        let artists: Vec<String> = self.artists.into_iter().map(|a| a.name).collect();
        let (album, artwork) = match self.album {
            Some(album) => {
                // Spotify lists images largest first.
                let art = album.images.into_iter().next().map(|i| i.url);
                (Some(album.name), art)
            }
            None => (None, None),
        };

        Some(SearchCandidate {
            name: self.name,
            artist: artists.first().cloned().unwrap_or_default(),
            artists,
            popularity: self.popularity.min(100),
            album,
            artwork,
            reference,
            score: 0.0,
        })
    }
}

/// Builds the `q` parameter from free text plus field filters.
pub(crate) fn compose_query(
    query: Option<&str>,
    artist: Option<&str>,
    track: Option<&str>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(q) = non_blank(query) {
        parts.push(q.to_string());
    }
    if let Some(t) = non_blank(track) {
        parts.push(format!("track:{t}"));
    }
    if let Some(a) = non_blank(artist) {
        parts.push(format!("artist:{a}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Spotify Web API client authenticated through an [`OAuthSession`].
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    session: Arc<OAuthSession>,
    api_base: String,
}

impl SpotifyClient {
    #[must_use]
    pub fn new(http: Client, session: Arc<OAuthSession>) -> Self {
        Self::with_base_url(http, session, SPOTIFY_API_BASE)
    }

    /// Client against a non-default API root (used by tests).
    #[must_use]
    pub fn with_base_url(http: Client, session: Arc<OAuthSession>, api_base: &str) -> Self {
        Self {
            http,
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TrackSearch for SpotifyClient {
    async fn search(
        &self,
        query: Option<&str>,
        artist: Option<&str>,
        track: Option<&str>,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, SpotifyError> {
        let Some(q) = compose_query(query, artist, track) else {
            return Ok(Vec::new());
        };
        log::info!("[Spotify] Searching tracks: {}", q);

        let url = format!("{}/search", self.api_base);
        let limit = limit.to_string();
        let response = self
            .session
            .send_authorized(|| {
                self.http.get(&url).query(&[
                    ("q", q.as_str()),
                    ("type", "track"),
                    ("limit", limit.as_str()),
                ])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: SearchResponse = response.json().await?;
        let candidates: Vec<SearchCandidate> = body
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(TrackItem::into_candidate)
            .collect();

        log::debug!("[Spotify] {} candidates for {:?}", candidates.len(), q);
        Ok(candidates)
    }
}

#[async_trait]
impl PlaybackPauser for SpotifyClient {
    async fn pause_playback(&self) -> Result<(), SpotifyError> {
        let url = format!("{}/me/player/pause", self.api_base);
        let response = self
            .session
            .send_authorized(|| self.http.put(&url).header(CONTENT_LENGTH, 0))
            .await?;

        let status = response.status();
        if status.is_success() {
            log::info!("[Spotify] Paused active playback");
            return Ok(());
        }
        // 404: no active device. 403: already paused (restriction violated).
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            log::debug!("[Spotify] Nothing to pause ({})", status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SpotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
