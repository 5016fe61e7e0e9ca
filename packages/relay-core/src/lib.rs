//! Relay Core - shared library for the Sonos relay.
//!
//! The relay turns HTTP triggers (arrival webhooks, "play X" requests) into
//! music on a Sonos speaker: named favorites through the Sonos Control API,
//! or arbitrary Spotify tracks found by search and loaded over the speaker's
//! local UPnP/SOAP services.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`sonos`]: Speaker control over UPnP/SOAP, URIs and DIDL-Lite metadata
//! - [`spotify`]: Spotify Web API search and pause
//! - [`cloud`]: Sonos Control API households, groups and favorites
//! - [`auth`]: OAuth sessions, token persistence and refresh
//! - [`services`]: Playback orchestration, search ranking and the playback queue
//! - [`api`]: Axum routes
//! - [`state`]: Configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Services depend on traits rather than concrete clients so they can run
//! against in-memory fakes:
//!
//! - [`SpeakerControl`](sonos::SpeakerControl): Speaker operations
//! - [`TrackSearch`](spotify::TrackSearch): Search provider
//! - [`PlaybackPauser`](spotify::PlaybackPauser): Pausing the streaming app
//! - [`CloudFavorites`](cloud::CloudFavorites): Cloud favorite playback

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod cloud;
pub mod error;
pub mod protocol_constants;
pub mod services;
pub mod sonos;
pub mod spotify;
pub mod state;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{ErrorCode, RelayError, RelayResult, SoapResult};
pub use state::{Config, OAuthAppConfig};
pub use utils::now_millis;

// Re-export Sonos types
pub use sonos::{
    build_display_document, SonosService, SpeakerAddress, SpeakerClient, SpeakerControl,
    TrackMetadata, TrackReference, TransportInfo, TransportState,
};

// Re-export service types
pub use services::{
    rank, PlaybackIntent, PlaybackOutcome, PlaybackQueue, PlaybackRequest, SearchCandidate,
    SearchPlayResult, SearchPlayer, TrackPlayer,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
