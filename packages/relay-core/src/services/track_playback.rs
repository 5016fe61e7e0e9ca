//! Track playback orchestration on the local speaker.
//!
//! Sequences the speaker operations needed to start a Spotify track, and
//! optionally hands over to the track's radio station once the first track
//! is audible. Every failure is turned into a [`PlaybackOutcome`]; callers
//! never see an `Err`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::SoapResult;
use crate::sonos::didl::{build_display_document, TrackMetadata};
use crate::sonos::traits::SpeakerControl;
use crate::sonos::uri::TrackReference;

/// One speaker operation in a playback sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStep {
    SetVolume,
    LoadTrack,
    Play,
    Settle,
    LoadRadio,
    PlayRadio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Play exactly the requested track.
    Single,
    /// Play the track, then continue with its radio station.
    Continuous,
}

/// Everything needed to play one chosen track.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    pub track: TrackReference,
    pub metadata: TrackMetadata,
    pub continuous: bool,
    pub volume: Option<u8>,
}

/// Result of a playback sequence.
///
/// On failure `completed_steps` shows how far the sequence got; in
/// continuous mode the initial track may be playing even though `success`
/// is false.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackOutcome {
    pub success: bool,
    pub mode: PlaybackMode,
    pub track: TrackReference,
    pub completed_steps: Vec<PlaybackStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drives one speaker through track and radio playback.
#[derive(Clone)]
pub struct TrackPlayer {
    speaker: Arc<dyn SpeakerControl>,
    settle_delay: Duration,
}

impl TrackPlayer {
    /// # Arguments
    /// * `speaker` - Speaker to control
    /// * `settle_delay` - Wait between starting the track and switching to radio
    pub fn new(speaker: Arc<dyn SpeakerControl>, settle_delay: Duration) -> Self {
        Self {
            speaker,
            settle_delay,
        }
    }

    #[must_use]
    pub fn speaker(&self) -> &Arc<dyn SpeakerControl> {
        &self.speaker
    }

    /// Plays `request` in the mode it asks for.
    pub async fn play(&self, request: &PlaybackRequest) -> PlaybackOutcome {
        if request.continuous {
            self.play_track_with_continuous_mode(&request.track, &request.metadata, request.volume)
                .await
        } else {
            self.play_track(&request.track, &request.metadata, request.volume)
                .await
        }
    }

    /// Sets the volume (if given), loads the track and starts playback.
    ///
    /// The first failing step aborts the sequence. Nothing is rolled back: a
    /// volume already set stays set.
    pub async fn play_track(
        &self,
        track: &TrackReference,
        metadata: &TrackMetadata,
        volume: Option<u8>,
    ) -> PlaybackOutcome {
        let mut steps = Vec::new();
        let result = self.start_track(track, metadata, volume, &mut steps).await;
        finish(PlaybackMode::Single, track, steps, result)
    }

    /// Plays the track, waits for it to settle, then switches the transport
    /// to the track's radio station with a " Radio" title.
    ///
    /// Switching immediately makes the speaker skip the requested track, so
    /// the radio source is only loaded once the track is audible.
    pub async fn play_track_with_continuous_mode(
        &self,
        track: &TrackReference,
        metadata: &TrackMetadata,
        volume: Option<u8>,
    ) -> PlaybackOutcome {
        let mut steps = Vec::new();
        let mut result = self.start_track(track, metadata, volume, &mut steps).await;

        if result.is_ok() {
            tokio::time::sleep(self.settle_delay).await;
            steps.push(PlaybackStep::Settle);
            result = self.start_radio(track, metadata, &mut steps).await;
            if let Err(e) = &result {
                log::warn!(
                    "[Playback] Radio handover failed for {}, track keeps playing: {}",
                    track,
                    e
                );
            }
        }

        finish(PlaybackMode::Continuous, track, steps, result)
    }

    async fn start_track(
        &self,
        track: &TrackReference,
        metadata: &TrackMetadata,
        volume: Option<u8>,
        steps: &mut Vec<PlaybackStep>,
    ) -> SoapResult<()> {
        if let Some(level) = volume {
            self.speaker.set_volume(level).await?;
            steps.push(PlaybackStep::SetVolume);
        }

        self.speaker.load_track(track, metadata).await?;
        steps.push(PlaybackStep::LoadTrack);

        self.speaker.play().await?;
        steps.push(PlaybackStep::Play);

        log::info!(
            "[Playback] Playing {} ({} - {})",
            track,
            metadata.artist_or_default(),
            metadata.title_or_default()
        );
        Ok(())
    }

    async fn start_radio(
        &self,
        track: &TrackReference,
        metadata: &TrackMetadata,
        steps: &mut Vec<PlaybackStep>,
    ) -> SoapResult<()> {
        let radio = metadata.for_radio(track.radio_reference());
        let didl = build_display_document(&radio);

        self.speaker
            .set_transport_uri(&track.to_radio_uri(), &didl)
            .await?;
        steps.push(PlaybackStep::LoadRadio);

        self.speaker.play().await?;
        steps.push(PlaybackStep::PlayRadio);

        log::info!("[Playback] Switched to {}", radio.title_or_default());
        Ok(())
    }
}

fn finish(
    mode: PlaybackMode,
    track: &TrackReference,
    completed_steps: Vec<PlaybackStep>,
    result: SoapResult<()>,
) -> PlaybackOutcome {
    let error = result.err().map(|e| {
        log::warn!("[Playback] {} failed after {:?}: {}", track, completed_steps, e);
        e.to_string()
    });
    PlaybackOutcome {
        success: error.is_none(),
        mode,
        track: track.clone(),
        completed_steps,
        error,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sonos::soap::SoapError;
    use crate::sonos::types::TransportInfo;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    /// Records every call; fails the call whose name matches `fail_on`
    /// (counting from 1 with `fail_on_nth`).
    #[derive(Default)]
    pub(crate) struct RecordingSpeaker {
        pub calls: Mutex<Vec<(String, Instant)>>,
        pub uris: Mutex<Vec<(String, String)>>,
        pub fail_on: Option<(&'static str, usize)>,
    }

    impl RecordingSpeaker {
        pub fn failing(action: &'static str, nth: usize) -> Self {
            Self {
                fail_on: Some((action, nth)),
                ..Self::default()
            }
        }

        pub fn call_names(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(n, _)| n.clone()).collect()
        }

        fn record(&self, name: &str) -> SoapResult<()> {
            let mut calls = self.calls.lock();
            calls.push((name.to_string(), Instant::now()));
            let nth = calls.iter().filter(|(n, _)| n == name).count();
            match self.fail_on {
                Some((action, fail_nth)) if action == name && fail_nth == nth => {
                    Err(SoapError::HttpStatus(500, format!("{name} failed")))
                }
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl SpeakerControl for RecordingSpeaker {
        async fn set_transport_uri(&self, uri: &str, metadata: &str) -> SoapResult<()> {
            self.uris.lock().push((uri.to_string(), metadata.to_string()));
            self.record("SetAVTransportURI")
        }
        async fn play(&self) -> SoapResult<()> {
            self.record("Play")
        }
        async fn pause(&self) -> SoapResult<()> {
            self.record("Pause")
        }
        async fn stop(&self) -> SoapResult<()> {
            self.record("Stop")
        }
        async fn set_volume(&self, _level: u8) -> SoapResult<()> {
            self.record("SetVolume")
        }
        async fn get_transport_state(&self) -> SoapResult<TransportInfo> {
            self.record("GetTransportInfo")?;
            Ok(TransportInfo::from_raw("STOPPED", Some("OK".into())))
        }
    }

    fn track() -> TrackReference {
        TrackReference::parse("spotify:track:abc123").unwrap()
    }

    fn metadata() -> TrackMetadata {
        TrackMetadata {
            title: Some("Starlight".into()),
            artist: Some("Muse".into()),
            ..TrackMetadata::default()
        }
    }

    fn player(speaker: &Arc<RecordingSpeaker>) -> TrackPlayer {
        TrackPlayer::new(speaker.clone(), Duration::from_millis(2000))
    }

    #[tokio::test]
    async fn single_play_with_volume_runs_three_steps_in_order() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let outcome = player(&speaker).play_track(&track(), &metadata(), Some(25)).await;

        assert!(outcome.success);
        assert_eq!(speaker.call_names(), ["SetVolume", "SetAVTransportURI", "Play"]);
        assert_eq!(
            outcome.completed_steps,
            [PlaybackStep::SetVolume, PlaybackStep::LoadTrack, PlaybackStep::Play]
        );
        let (uri, _) = &speaker.uris.lock()[0];
        assert_eq!(
            uri,
            "x-sonos-spotify:spotify%3Atrack%3Aabc123?sid=12&flags=8224&sn=7"
        );
    }

    #[tokio::test]
    async fn without_volume_skips_set_volume() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let outcome = player(&speaker).play_track(&track(), &metadata(), None).await;

        assert!(outcome.success);
        assert_eq!(speaker.call_names(), ["SetAVTransportURI", "Play"]);
    }

    #[tokio::test]
    async fn load_failure_aborts_before_play() {
        let speaker = Arc::new(RecordingSpeaker::failing("SetAVTransportURI", 1));
        let outcome = player(&speaker).play_track(&track(), &metadata(), Some(10)).await;

        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("500"));
        assert_eq!(outcome.completed_steps, [PlaybackStep::SetVolume]);
        assert_eq!(speaker.call_names(), ["SetVolume", "SetAVTransportURI"]);
    }

    #[tokio::test]
    async fn play_failure_keeps_volume_and_load_side_effects() {
        let speaker = Arc::new(RecordingSpeaker::failing("Play", 1));
        let outcome = player(&speaker).play_track(&track(), &metadata(), Some(30)).await;

        assert!(!outcome.success);
        assert_eq!(outcome.mode, PlaybackMode::Single);
        assert_eq!(
            outcome.completed_steps,
            [PlaybackStep::SetVolume, PlaybackStep::LoadTrack]
        );
        assert_eq!(speaker.call_names(), ["SetVolume", "SetAVTransportURI", "Play"]);
        assert_eq!(outcome.error.as_deref(), Some("HTTP error 500: Play failed"));
        assert_eq!(speaker.uris.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn continuous_mode_switches_to_radio_after_settle_delay() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let outcome = player(&speaker)
            .play_track_with_continuous_mode(&track(), &metadata(), None)
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.mode, PlaybackMode::Continuous);
        assert_eq!(
            speaker.call_names(),
            ["SetAVTransportURI", "Play", "SetAVTransportURI", "Play"]
        );

        let calls = speaker.calls.lock();
        let gap = calls[2].1 - calls[1].1;
        assert!(gap >= Duration::from_millis(2000));

        let uris = speaker.uris.lock();
        assert_eq!(
            uris[1].0,
            "x-sonos-spotify:spotify%3Atrackradio%3Aabc123?sid=12&flags=8224&sn=7"
        );
        assert!(uris[1].1.contains("<dc:title>Starlight Radio</dc:title>"));
    }

    #[tokio::test(start_paused = true)]
    async fn radio_failure_reports_error_but_track_was_started() {
        let speaker = Arc::new(RecordingSpeaker::failing("Play", 2));
        let outcome = player(&speaker)
            .play_track_with_continuous_mode(&track(), &metadata(), None)
            .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.completed_steps,
            [
                PlaybackStep::LoadTrack,
                PlaybackStep::Play,
                PlaybackStep::Settle,
                PlaybackStep::LoadRadio
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn continuous_mode_stops_when_initial_track_fails() {
        let speaker = Arc::new(RecordingSpeaker::failing("Play", 1));
        let outcome = player(&speaker)
            .play_track_with_continuous_mode(&track(), &metadata(), None)
            .await;

        assert!(!outcome.success);
        assert_eq!(speaker.call_names(), ["SetAVTransportURI", "Play"]);
        assert!(!outcome.completed_steps.contains(&PlaybackStep::Settle));
    }

    #[tokio::test]
    async fn request_dispatches_on_continuous_flag() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let request = PlaybackRequest {
            track: track(),
            metadata: metadata(),
            continuous: false,
            volume: None,
        };
        let outcome = player(&speaker).play(&request).await;
        assert_eq!(outcome.mode, PlaybackMode::Single);
    }
}
