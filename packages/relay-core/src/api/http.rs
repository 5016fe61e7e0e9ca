//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::oauth;
use crate::api::response::{api_accepted, api_error, api_ok, api_success};
use crate::api::AppState;
use crate::error::{RelayError, RelayResult};
use crate::protocol_constants::SERVICE_ID;
use crate::services::{PlaybackIntent, PlaybackRequest, SearchTerms, TrackSummary};
use crate::sonos::{TrackMetadata, TrackReference};
use crate::utils::non_blank;

// ─────────────────────────────────────────────────────────────────────────────
// Request Bodies
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ArrivalRequest {
    /// Overrides the configured arrival favorite.
    favorite: Option<String>,
    volume: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PlayFavoriteRequest {
    name: String,
    volume: Option<u8>,
    #[serde(default)]
    wait: bool,
}

#[derive(Debug, Deserialize)]
struct PlayTrackRequest {
    /// `spotify:track:<id>`
    reference: String,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    artwork: Option<String>,
    #[serde(default)]
    continuous: bool,
    volume: Option<u8>,
    #[serde(default)]
    wait: bool,
}

fn default_continuous() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct PlaySearchRequest {
    query: Option<String>,
    artist: Option<String>,
    track: Option<String>,
    #[serde(default = "default_continuous")]
    continuous: bool,
    volume: Option<u8>,
    #[serde(default)]
    wait: bool,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: Option<String>,
    artist: Option<String>,
    track: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VolumeRequest {
    volume: u8,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Callers are home-automation hubs and scripts, not browsers on a fixed
    // origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .route("/webhook/arrival", post(handle_arrival))
        .route("/api/play/favorite", post(play_favorite))
        .route("/api/play/track", post(play_track))
        .route("/api/play/search", post(play_search))
        .route("/api/search", post(search))
        .route("/api/favorites", get(list_favorites))
        .route("/api/speaker/status", get(speaker_status))
        .route("/api/speaker/play", post(speaker_play))
        .route("/api/speaker/pause", post(speaker_pause))
        .route("/api/speaker/stop", post(speaker_stop))
        .route("/api/speaker/volume", post(speaker_volume))
        .route("/auth/status", get(oauth::auth_status))
        .route("/auth/{provider}/login", get(oauth::login))
        .route("/auth/{provider}/callback", get(oauth::callback))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_optional_body<T: for<'de> Deserialize<'de> + Default>(body: &Bytes) -> RelayResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| RelayError::InvalidRequest(e.to_string()))
}

fn validate_volume(volume: Option<u8>) -> RelayResult<()> {
    match volume {
        Some(v) if v > 100 => Err(RelayError::InvalidRequest(format!(
            "volume must be between 0 and 100, got {}",
            v
        ))),
        _ => Ok(()),
    }
}

/// Queues `intent`, or runs it and returns its result when `wait` is set.
async fn dispatch(
    state: &AppState,
    intent: PlaybackIntent,
    kind: &str,
    wait: bool,
) -> RelayResult<Response> {
    if wait {
        let result = state.queue.submit(intent).await?;
        return Ok(api_success(result).into_response());
    }
    let id = state.queue.enqueue(intent)?;
    Ok(api_accepted(id, kind).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe. Does not contact the speaker.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "speaker": state.config.speaker_address().map(|a| a.to_string()),
    }))
}

/// Arrival webhook: plays the configured (or given) favorite.
///
/// The body is optional so bare `POST`s from automation hubs work.
async fn handle_arrival(State(state): State<AppState>, body: Bytes) -> RelayResult<Response> {
    let request: ArrivalRequest = parse_optional_body(&body)?;
    validate_volume(request.volume)?;

    let name = non_blank(request.favorite.as_deref())
        .or(non_blank(state.config.arrival_favorite.as_deref()))
        .ok_or_else(|| {
            RelayError::Configuration("no arrival favorite configured or given".into())
        })?
        .to_string();

    log::info!("[Webhook] Arrival, playing favorite {:?}", name);
    let intent = PlaybackIntent::Favorite {
        name,
        volume: request.volume.or(state.config.default_volume),
    };
    dispatch(&state, intent, "favorite", false).await
}

async fn play_favorite(
    State(state): State<AppState>,
    Json(payload): Json<PlayFavoriteRequest>,
) -> RelayResult<Response> {
    validate_volume(payload.volume)?;
    let name = non_blank(Some(payload.name.as_str()))
        .ok_or_else(|| RelayError::InvalidRequest("name must not be empty".into()))?
        .to_string();

    let intent = PlaybackIntent::Favorite {
        name,
        volume: payload.volume.or(state.config.default_volume),
    };
    dispatch(&state, intent, "favorite", payload.wait).await
}

async fn play_track(
    State(state): State<AppState>,
    Json(payload): Json<PlayTrackRequest>,
) -> RelayResult<Response> {
    validate_volume(payload.volume)?;
    let track = TrackReference::parse(payload.reference.trim())?;

    let intent = PlaybackIntent::Track(PlaybackRequest {
        metadata: TrackMetadata {
            title: payload.title,
            artist: payload.artist,
            album: payload.album,
            album_art_uri: payload.artwork,
            track_uri: Some(track.to_string()),
        },
        track,
        continuous: payload.continuous,
        volume: payload.volume.or(state.config.default_volume),
    });
    dispatch(&state, intent, "track", payload.wait).await
}

async fn play_search(
    State(state): State<AppState>,
    Json(payload): Json<PlaySearchRequest>,
) -> RelayResult<Response> {
    validate_volume(payload.volume)?;
    let terms = SearchTerms::new(
        payload.query.as_deref(),
        payload.artist.as_deref(),
        payload.track.as_deref(),
    );
    if terms.is_empty() {
        return Err(RelayError::InvalidRequest(
            "one of query, artist or track is required".into(),
        ));
    }

    let intent = PlaybackIntent::Search {
        terms,
        continuous: payload.continuous,
        volume: payload.volume.or(state.config.default_volume),
    };
    dispatch(&state, intent, "search", payload.wait).await
}

/// Ranked search results without playback.
async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> RelayResult<impl IntoResponse> {
    let terms = SearchTerms::new(
        payload.query.as_deref(),
        payload.artist.as_deref(),
        payload.track.as_deref(),
    );
    if terms.is_empty() {
        return Err(RelayError::InvalidRequest(
            "one of query, artist or track is required".into(),
        ));
    }

    let ranked = state.search_player.search(&terms).await?;
    let results: Vec<TrackSummary> = ranked.iter().map(TrackSummary::from).collect();
    Ok(api_success(json!({ "query": terms, "results": results })))
}

async fn list_favorites(State(state): State<AppState>) -> RelayResult<impl IntoResponse> {
    let favorites = state.favorite_player.list_favorites().await?;
    Ok(api_success(json!({ "favorites": favorites })))
}

/// Reports whether the speaker answers and what it is doing.
async fn speaker_status(State(state): State<AppState>) -> Response {
    let address = state.config.speaker_address().map(|a| a.to_string());
    match state.speaker.get_transport_state().await {
        Ok(info) => api_success(json!({
            "speaker": address,
            "reachable": true,
            "transportState": info.raw_state,
            "transportStatus": info.status,
        }))
        .into_response(),
        Err(e) => {
            log::warn!("[Sonos] Status query failed: {}", e);
            api_error(StatusCode::BAD_GATEWAY, "speaker_unreachable", e).into_response()
        }
    }
}

async fn speaker_play(State(state): State<AppState>) -> RelayResult<impl IntoResponse> {
    state.speaker.play().await?;
    Ok(api_ok())
}

async fn speaker_pause(State(state): State<AppState>) -> RelayResult<impl IntoResponse> {
    state.speaker.pause().await?;
    Ok(api_ok())
}

async fn speaker_stop(State(state): State<AppState>) -> RelayResult<impl IntoResponse> {
    state.speaker.stop().await?;
    Ok(api_ok())
}

/// Sets the speaker volume as given; the speaker validates the range.
async fn speaker_volume(
    State(state): State<AppState>,
    Json(payload): Json<VolumeRequest>,
) -> RelayResult<impl IntoResponse> {
    state.speaker.set_volume(payload.volume).await?;
    Ok(api_success(json!({ "volume": payload.volume })))
}
