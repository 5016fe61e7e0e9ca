//! Speaker-local control of a Sonos player over UPnP/SOAP.
//!
//! # Module Structure
//!
//! - `types` - Speaker address and transport state
//! - `services` - UPnP service definitions (URNs, paths)
//! - `soap` - Low-level SOAP envelope and transport
//! - `uri` - Spotify track references and `x-sonos-spotify:` URIs
//! - `didl` - DIDL-Lite display metadata
//! - `traits` - `SpeakerControl` abstraction for testability
//! - `client` - `SpeakerClient` concrete implementation
//! - `utils` - XML escaping and extraction helpers

pub mod client;
pub mod didl;
pub mod services;
pub mod soap;
pub mod traits;
pub mod types;
pub mod uri;
pub mod utils;

pub use client::SpeakerClient;
pub use didl::{build_display_document, TrackMetadata};
pub use services::SonosService;
pub use soap::{SoapError, SoapResult};
pub use traits::SpeakerControl;
pub use types::{SpeakerAddress, TransportInfo, TransportState};
pub use uri::{InvalidReferenceError, TrackReference};
