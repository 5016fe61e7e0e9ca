//! Low-level SOAP protocol implementation for UPnP/Sonos communication.
//!
//! This module handles the raw SOAP envelope building and HTTP transport.
//! For the semantic speaker operations, see `client.rs`.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::services::SonosService;
use super::types::SpeakerAddress;
use super::utils::{build_speaker_url, escape_xml, extract_xml_text};
use crate::protocol_constants::{
    INSTANCE_ID, SOAP_ENCODING_NS, SOAP_ENVELOPE_NS, SOAP_TIMEOUT_SECS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while talking to a speaker over SOAP.
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network-level failure (connection refused, timeout, DNS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Speaker returned a non-success HTTP status without a SOAP fault.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Speaker returned a non-success HTTP status carrying a SOAP fault.
    #[error("SOAP fault (HTTP {0}): {1}")]
    Fault(u16, String),

    /// A successful response was missing an expected element.
    #[error("Failed to parse SOAP response: missing {0}")]
    Parse(&'static str),

    /// The request builder was sent without a service or action.
    #[error("Incomplete SOAP request: {0} not set")]
    Incomplete(&'static str),
}

impl SoapError {
    /// HTTP status returned by the speaker, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(status, _) | Self::Fault(status, _) => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenient Result alias for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request/Response
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the SOAP envelope for one UPnP action.
///
/// The envelope is a single line with no leading whitespace; the Sonos SOAP
/// parser rejects whitespace before the root element. Argument values are
/// XML-escaped, so pre-built documents (DIDL-Lite) travel as text.
#[must_use]
pub fn build_envelope(service_urn: &str, action: &str, args: &[(&str, &str)]) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="{}" s:encodingStyle="{}"><s:Body><u:{} xmlns:u="{}">"#,
        SOAP_ENVELOPE_NS, SOAP_ENCODING_NS, action, service_urn
    );

    for (k, v) in args {
        body.push_str(&format!("<{k}>{}</{k}>", escape_xml(v)));
    }

    body.push_str(&format!(r#"</u:{}></s:Body></s:Envelope>"#, action));
    body
}

/// Sends one SOAP action to a speaker.
///
/// This is the core transport function for all UPnP SOAP operations. A 2xx
/// status returns the body verbatim; anything else is a `SoapError`. No
/// retries happen at this layer.
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `address` - Speaker host and port
/// * `endpoint` - The control URL path (e.g., "/MediaRenderer/AVTransport/Control")
/// * `service` - The UPnP service URN (e.g., "urn:schemas-upnp-org:service:AVTransport:1")
/// * `action` - The SOAP action name (e.g., "Play", "SetVolume")
/// * `args` - Key-value pairs for action arguments (order is preserved)
pub async fn send_soap_request(
    client: &Client,
    address: &SpeakerAddress,
    endpoint: &str,
    service: &str,
    action: &str,
    args: &[(&str, &str)],
) -> SoapResult<String> {
    let url = build_speaker_url(address, endpoint);
    let body = build_envelope(service, action, args);

    log::info!("[SOAP] {} -> {} (body: {} bytes)", action, url, body.len());
    log::debug!("[SOAP] Request body: {}", body);

    let start = std::time::Instant::now();
    let res = client
        .post(&url)
        .header("Content-Type", "text/xml; charset=utf-8")
        .header("SOAPAction", format!("\"{}#{}\"", service, action))
        .body(body)
        .timeout(Duration::from_secs(SOAP_TIMEOUT_SECS))
        .send()
        .await;

    log::info!(
        "[SOAP] {} completed in {:?}: {:?}",
        action,
        start.elapsed(),
        res.as_ref().map(|r| r.status())
    );

    let res = res?;
    let status = res.status();
    let response_text = res.text().await?;

    if !status.is_success() {
        if let Some(fault) = extract_fault(&response_text) {
            return Err(SoapError::Fault(status.as_u16(), fault));
        }
        return Err(SoapError::HttpStatus(status.as_u16(), response_text));
    }

    Ok(response_text)
}

/// Extracts a readable message from a SOAP fault body.
///
/// UPnP faults carry the useful part in `UPnPError/errorCode`; the
/// `faultstring` is usually just "UPnPError".
fn extract_fault(xml: &str) -> Option<String> {
    let fault_string = extract_xml_text(xml, "faultstring")?;
    match extract_xml_text(xml, "errorCode") {
        Some(code) => Some(format!("{} (errorCode {})", fault_string, code)),
        None => Some(fault_string),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for constructing and sending SOAP requests to a speaker.
///
/// # Example
/// ```ignore
/// let response = SoapRequestBuilder::new(&client, &address)
///     .service(SonosService::AVTransport)
///     .action("Play")
///     .instance_id()
///     .arg("Speed", "1")
///     .send()
///     .await?;
/// ```
pub struct SoapRequestBuilder<'a> {
    client: &'a Client,
    address: &'a SpeakerAddress,
    service: Option<SonosService>,
    action: Option<&'a str>,
    args: Vec<(&'a str, String)>,
}

impl<'a> SoapRequestBuilder<'a> {
    #[must_use]
    pub fn new(client: &'a Client, address: &'a SpeakerAddress) -> Self {
        Self {
            client,
            address,
            service: None,
            action: None,
            args: Vec::new(),
        }
    }

    /// Sets the UPnP service for this request.
    #[must_use]
    pub fn service(mut self, service: SonosService) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the SOAP action name.
    #[must_use]
    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action);
        self
    }

    /// Adds an argument; arguments are emitted in insertion order.
    #[must_use]
    pub fn arg(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.args.push((key, value.into()));
        self
    }

    /// Adds the fixed `InstanceID` argument used by every renderer action.
    #[must_use]
    pub fn instance_id(self) -> Self {
        self.arg("InstanceID", INSTANCE_ID)
    }

    /// Sends the SOAP request and returns the response body.
    ///
    /// # Errors
    /// Returns `SoapError::Incomplete` if the service or action is not set,
    /// otherwise whatever the transport reports.
    pub async fn send(self) -> SoapResult<String> {
        let service = self.service.ok_or(SoapError::Incomplete("service"))?;
        let action = self.action.ok_or(SoapError::Incomplete("action"))?;

        let args: Vec<(&str, &str)> = self.args.iter().map(|(k, v)| (*k, v.as_str())).collect();

        send_soap_request(
            self.client,
            self.address,
            service.control_path(),
            service.urn(),
            action,
            &args,
        )
        .await
    }

    /// Returns the request parts without sending (for testing).
    #[cfg(test)]
    pub fn into_parts(self) -> Option<(SonosService, &'a str, Vec<(&'a str, String)>)> {
        let service = self.service?;
        let action = self.action?;
        Some((service, action, self.args))
    }
}
