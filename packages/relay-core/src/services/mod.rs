//! Application services layer.
//!
//! This module contains the orchestration that sits between the API layer
//! and the protocol clients (sonos/, spotify/, cloud/).

pub mod favorite_playback;
pub mod playback_queue;
pub mod ranking;
pub mod search_and_play;
pub mod track_playback;

pub use favorite_playback::{FavoriteOutcome, FavoritePlayer};
pub use playback_queue::{IntentResult, PlaybackExecutor, PlaybackIntent, PlaybackQueue, QueueClosed};
pub use ranking::{rank, SearchCandidate};
pub use search_and_play::{SearchPlayResult, SearchPlayer, SearchTerms, TrackSummary};
pub use track_playback::{PlaybackMode, PlaybackOutcome, PlaybackRequest, PlaybackStep, TrackPlayer};
