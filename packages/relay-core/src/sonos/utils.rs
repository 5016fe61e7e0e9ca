//! Shared helpers for the UPnP layer: XML escaping, text extraction and
//! speaker URL building.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::sonos::types::SpeakerAddress;

/// Escapes the five XML special characters (`& < > " '`).
///
/// `&` is replaced first so entities produced by the later substitutions are
/// not escaped twice.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Builds the full control URL for a speaker endpoint.
#[must_use]
pub fn build_speaker_url(address: &SpeakerAddress, endpoint: &str) -> String {
    format!("http://{}{}", address, endpoint)
}

/// Extracts text content from the first occurrence of an XML element.
///
/// Matches on the local name, so namespace prefixes are ignored. Entities in
/// the text are decoded.
///
/// # Example
/// ```ignore
/// let xml = r#"<u:CurrentTransportState>PLAYING</u:CurrentTransportState>"#;
/// assert_eq!(extract_xml_text(xml, "CurrentTransportState"), Some("PLAYING".into()));
/// ```
pub fn extract_xml_text(xml: &str, element_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let target_bytes = element_name.as_bytes();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == target_bytes => {
                if let Ok(text) = reader.read_text(e.name()) {
                    let decoded = html_escape::decode_html_entities(&text);
                    return Some(decoded.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    None
}
