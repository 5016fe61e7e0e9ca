//! Fixed protocol constants that should NOT be changed.
//!
//! These values are fixed by UPnP, the Sonos Spotify integration and the
//! OAuth providers. Speakers and APIs reject anything else.

// ─────────────────────────────────────────────────────────────────────────────
// UPnP / SOAP
// ─────────────────────────────────────────────────────────────────────────────

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style URI.
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Default Sonos speaker control port.
pub const SONOS_PORT: u16 = 1400;

/// Timeout for SOAP HTTP requests (seconds).
///
/// 10 seconds is reasonable for LAN operations and keeps an unreachable
/// speaker from hanging a request indefinitely.
pub const SOAP_TIMEOUT_SECS: u64 = 10;

/// UPnP AVTransport/RenderingControl instance identifier.
pub const INSTANCE_ID: &str = "0";

// ─────────────────────────────────────────────────────────────────────────────
// Sonos Spotify Integration
// ─────────────────────────────────────────────────────────────────────────────

/// URI scheme the speaker uses for Spotify content.
pub const SONOS_SPOTIFY_SCHEME: &str = "x-sonos-spotify:";

/// Query parameters registered for the Spotify music service on the speaker.
///
/// `sid` is the service id, `flags` and `sn` the account serial flags.
/// Opaque, must be sent verbatim.
pub const SONOS_SPOTIFY_PARAMS: &str = "sid=12&flags=8224&sn=7";

/// Prefix of a single Spotify track reference.
pub const SPOTIFY_TRACK_PREFIX: &str = "spotify:track:";

/// Prefix of a Spotify track-radio (continuous similar tracks) reference.
pub const SPOTIFY_TRACK_RADIO_PREFIX: &str = "spotify:trackradio:";

/// Delay between starting a track and switching the speaker to track radio.
///
/// Empirical: the speaker rejects a second URI change until it has started
/// streaming the first one. Tunable through `Config::continuous_settle_ms`.
pub const DEFAULT_CONTINUOUS_SETTLE_MS: u64 = 2000;

// ─────────────────────────────────────────────────────────────────────────────
// DIDL-Lite
// ─────────────────────────────────────────────────────────────────────────────

/// Placeholder title for tracks without a name.
pub const UNKNOWN_TRACK: &str = "Unknown Track";

/// Placeholder creator for tracks without an artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder album for tracks without an album.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

// ─────────────────────────────────────────────────────────────────────────────
// Web APIs
// ─────────────────────────────────────────────────────────────────────────────

/// Spotify Web API base URL.
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify accounts service base URL (authorize + token endpoints).
pub const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Scopes required for search and pausing the active Spotify device.
pub const SPOTIFY_SCOPES: &str = "user-read-playback-state user-modify-playback-state";

/// Sonos Control API base URL.
pub const SONOS_CLOUD_API_BASE: &str = "https://api.ws.sonos.com/control/api/v1";

/// Sonos login service base URL (authorize + token endpoints).
pub const SONOS_LOGIN_BASE: &str = "https://api.sonos.com/login/v3/oauth";

/// Scope required for Sonos Control API playback.
pub const SONOS_SCOPES: &str = "playback-control-all";

/// Timeout for cloud API HTTP requests (seconds).
pub const CLOUD_TIMEOUT_SECS: u64 = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier returned by the health endpoint.
pub const SERVICE_ID: &str = "sonos-relay";

/// Number of runner-up tracks included in a search-and-play result.
pub const MAX_ALTERNATIVES: usize = 4;

/// Lifetime of an OAuth `state` value issued by the login route.
pub const AUTH_STATE_TTL_MS: u64 = 10 * 60 * 1000;

/// Upper bound on outstanding OAuth `state` values; the oldest is evicted.
pub const MAX_PENDING_AUTH_STATES: usize = 64;
