//! Trait abstraction for speaker control.
//!
//! Orchestration services depend on this trait rather than the concrete
//! SOAP client, so they can be exercised against in-memory fakes.

use async_trait::async_trait;

use crate::error::SoapResult;
use crate::sonos::didl::{build_display_document, TrackMetadata};
use crate::sonos::types::TransportInfo;
use crate::sonos::uri::TrackReference;

/// Semantic single-purpose operations on one speaker.
///
/// Every method maps to exactly one SOAP action (except the provided
/// helpers) and propagates `SoapError` unchanged. Nothing retries.
#[async_trait]
pub trait SpeakerControl: Send + Sync {
    /// Sets the transport source (`SetAVTransportURI`).
    ///
    /// # Arguments
    /// * `uri` - The speaker URI to load
    /// * `metadata` - DIDL-Lite display document (sent escaped)
    async fn set_transport_uri(&self, uri: &str, metadata: &str) -> SoapResult<()>;

    /// Starts or resumes playback of the current source.
    async fn play(&self) -> SoapResult<()>;

    /// Pauses playback.
    async fn pause(&self) -> SoapResult<()>;

    /// Stops playback.
    async fn stop(&self) -> SoapResult<()>;

    /// Sets the speaker's master volume.
    ///
    /// No clamping: values above 100 reach the speaker, which applies its own
    /// validation.
    async fn set_volume(&self, level: u8) -> SoapResult<()>;

    /// Queries the current transport state (`GetTransportInfo`).
    async fn get_transport_state(&self) -> SoapResult<TransportInfo>;

    /// Loads a single Spotify track as the transport source.
    async fn load_track(&self, track: &TrackReference, metadata: &TrackMetadata) -> SoapResult<()> {
        let metadata = TrackMetadata {
            track_uri: Some(track.to_string()),
            ..metadata.clone()
        };
        let didl = build_display_document(&metadata);
        self.set_transport_uri(&track.to_playable_uri(), &didl).await
    }

    /// Confirms the speaker answers, without interpreting its state.
    async fn test_connectivity(&self) -> bool {
        match self.get_transport_state().await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[Sonos] Connectivity test failed: {}", e);
                false
            }
        }
    }
}
