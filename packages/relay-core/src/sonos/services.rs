//! Sonos UPnP service definitions.
//!
//! Single source of truth for the service URNs and control paths the relay
//! talks to on the speaker's embedded media renderer.

use serde::Serialize;

/// UPnP services used for speaker control.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SonosService {
    /// Audio/Video transport control (set URI, play, pause, stop, transport info).
    AVTransport,
    /// Speaker volume control.
    RenderingControl,
}

impl SonosService {
    /// Returns the UPnP service URN for SOAP requests.
    #[must_use]
    pub fn urn(&self) -> &'static str {
        match self {
            Self::AVTransport => "urn:schemas-upnp-org:service:AVTransport:1",
            Self::RenderingControl => "urn:schemas-upnp-org:service:RenderingControl:1",
        }
    }

    /// Returns the UPnP control endpoint path for SOAP requests.
    #[must_use]
    pub fn control_path(&self) -> &'static str {
        match self {
            Self::AVTransport => "/MediaRenderer/AVTransport/Control",
            Self::RenderingControl => "/MediaRenderer/RenderingControl/Control",
        }
    }

    /// Returns a human-readable name for this service.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AVTransport => "AVTransport",
            Self::RenderingControl => "RenderingControl",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_paths_match_renderer_endpoints() {
        assert_eq!(
            SonosService::AVTransport.control_path(),
            "/MediaRenderer/AVTransport/Control"
        );
        assert_eq!(
            SonosService::RenderingControl.control_path(),
            "/MediaRenderer/RenderingControl/Control"
        );
    }

    #[test]
    fn urns_are_version_one() {
        assert!(SonosService::AVTransport.urn().ends_with("AVTransport:1"));
        assert!(SonosService::RenderingControl
            .urn()
            .ends_with("RenderingControl:1"));
    }
}
