//! DIDL-Lite metadata formatting for Sonos display.
//!
//! Creates the XML metadata document sent alongside `SetAVTransportURI` so the
//! speaker and the Sonos apps can show title, artist, album and artwork.

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use crate::sonos::uri::sonos_spotify_uri;
use crate::sonos::utils::escape_xml;

/// Display attributes of a track.
///
/// Every field is optional; missing text renders as a placeholder. The
/// `track_uri` is the Spotify reference the resource element points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_art_uri: Option<String>,
    pub track_uri: Option<String>,
}

impl TrackMetadata {
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(UNKNOWN_TRACK)
    }

    #[must_use]
    pub fn artist_or_default(&self) -> &str {
        non_empty(self.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST)
    }

    #[must_use]
    pub fn album_or_default(&self) -> &str {
        non_empty(self.album.as_deref()).unwrap_or(UNKNOWN_ALBUM)
    }

    /// Copy of this metadata for the track-radio transition: same artist and
    /// artwork, title suffixed with " Radio".
    #[must_use]
    pub fn for_radio(&self, radio_reference: String) -> Self {
        Self {
            title: Some(format!("{} Radio", self.title_or_default())),
            track_uri: Some(radio_reference),
            ..self.clone()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Formats DIDL-Lite metadata XML for Sonos display.
///
/// The document is built even when `track_uri` is absent; the resource then
/// wraps an empty reference. Every substituted value goes through
/// [`escape_xml`], including the resource URI whose `&` separators would
/// otherwise break the document.
#[must_use]
pub fn build_display_document(metadata: &TrackMetadata) -> String {
    let resource_uri = sonos_spotify_uri(metadata.track_uri.as_deref().unwrap_or_default());

    log::debug!(
        "[DIDL] title={:?}, artist={:?}, album={:?}, uri={}",
        metadata.title,
        metadata.artist,
        metadata.album,
        resource_uri
    );

    let mut didl = String::from(
        r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#,
    );
    didl.push_str(r#"<item id="-1" parentID="-1" restricted="true">"#);
    didl.push_str(&format!(
        "<dc:title>{}</dc:title>",
        escape_xml(metadata.title_or_default())
    ));
    didl.push_str(&format!(
        "<dc:creator>{}</dc:creator>",
        escape_xml(metadata.artist_or_default())
    ));
    didl.push_str(&format!(
        "<upnp:album>{}</upnp:album>",
        escape_xml(metadata.album_or_default())
    ));

    if let Some(art) = non_empty(metadata.album_art_uri.as_deref()) {
        didl.push_str(&format!(
            "<upnp:albumArtURI>{}</upnp:albumArtURI>",
            escape_xml(art)
        ));
    }

    didl.push_str("<upnp:class>object.item.audioItem.musicTrack</upnp:class>");
    didl.push_str(&format!(
        r#"<res protocolInfo="sonos.com-spotify:*:audio/x-spotify:*">{}</res>"#,
        escape_xml(&resource_uri)
    ));
    didl.push_str("</item>");
    didl.push_str("</DIDL-Lite>");

    didl
}
