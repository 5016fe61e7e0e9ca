//! Concrete speaker client.
//!
//! Implements [`SpeakerControl`] on top of the SOAP transport for the one
//! speaker configured at startup.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::SoapResult;
use crate::sonos::services::SonosService;
use crate::sonos::soap::{SoapError, SoapRequestBuilder};
use crate::sonos::traits::SpeakerControl;
use crate::sonos::types::{SpeakerAddress, TransportInfo};
use crate::sonos::utils::extract_xml_text;

/// SOAP-backed control of a single speaker.
#[derive(Clone)]
pub struct SpeakerClient {
    http: Client,
    address: SpeakerAddress,
}

impl SpeakerClient {
    /// Creates a client for the speaker at `address`, sharing `http` for
    /// connection pooling.
    #[must_use]
    pub fn new(http: Client, address: SpeakerAddress) -> Self {
        Self { http, address }
    }

    /// The speaker this client controls.
    #[must_use]
    pub fn address(&self) -> &SpeakerAddress {
        &self.address
    }

    fn request(&self) -> SoapRequestBuilder<'_> {
        SoapRequestBuilder::new(&self.http, &self.address)
    }
}

#[async_trait]
impl SpeakerControl for SpeakerClient {
    async fn set_transport_uri(&self, uri: &str, metadata: &str) -> SoapResult<()> {
        log::info!("[Sonos] SetAVTransportURI: {} uri={}", self.address, uri);

        self.request()
            .service(SonosService::AVTransport)
            .action("SetAVTransportURI")
            .instance_id()
            .arg("CurrentURI", uri)
            .arg("CurrentURIMetaData", metadata)
            .send()
            .await?;

        Ok(())
    }

    async fn play(&self) -> SoapResult<()> {
        log::info!("[Sonos] Sending Play command to {}", self.address);

        self.request()
            .service(SonosService::AVTransport)
            .action("Play")
            .instance_id()
            .arg("Speed", "1")
            .send()
            .await?;

        Ok(())
    }

    async fn pause(&self) -> SoapResult<()> {
        self.request()
            .service(SonosService::AVTransport)
            .action("Pause")
            .instance_id()
            .send()
            .await?;

        Ok(())
    }

    async fn stop(&self) -> SoapResult<()> {
        self.request()
            .service(SonosService::AVTransport)
            .action("Stop")
            .instance_id()
            .send()
            .await?;

        Ok(())
    }

    async fn set_volume(&self, level: u8) -> SoapResult<()> {
        log::info!("[Sonos] SetVolume {} on {}", level, self.address);

        self.request()
            .service(SonosService::RenderingControl)
            .action("SetVolume")
            .instance_id()
            .arg("Channel", "Master")
            .arg("DesiredVolume", level.to_string())
            .send()
            .await?;

        Ok(())
    }

    async fn get_transport_state(&self) -> SoapResult<TransportInfo> {
        let response = self
            .request()
            .service(SonosService::AVTransport)
            .action("GetTransportInfo")
            .instance_id()
            .send()
            .await?;

        let raw_state = extract_xml_text(&response, "CurrentTransportState")
            .ok_or(SoapError::Parse("CurrentTransportState"))?;
        let status = extract_xml_text(&response, "CurrentTransportStatus");

        Ok(TransportInfo::from_raw(raw_state, status))
    }
}
