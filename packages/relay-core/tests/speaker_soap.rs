//! Speaker control against a mock UPnP control endpoint.

use relay_core::sonos::soap::{send_soap_request, SoapError};
use relay_core::{SpeakerAddress, SpeakerClient, SpeakerControl, TrackMetadata, TrackReference, TransportState};
use reqwest::Client;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AV_TRANSPORT: &str = "urn:schemas-upnp-org:service:AVTransport:1";
const AV_PATH: &str = "/MediaRenderer/AVTransport/Control";
const RC_PATH: &str = "/MediaRenderer/RenderingControl/Control";

fn speaker(server: &MockServer) -> SpeakerClient {
    SpeakerClient::new(
        Client::new(),
        SpeakerAddress::with_port("127.0.0.1", server.address().port()),
    )
}

fn ok_response(action: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:{action}Response xmlns:u="{AV_TRANSPORT}"></u:{action}Response></s:Body></s:Envelope>"#
    ))
}

#[tokio::test]
async fn play_posts_envelope_with_soap_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AV_PATH))
        .and(header("content-type", "text/xml; charset=utf-8"))
        .and(header("soapaction", "\"urn:schemas-upnp-org:service:AVTransport:1#Play\""))
        .and(body_string_contains("<InstanceID>0</InstanceID><Speed>1</Speed>"))
        .respond_with(ok_response("Play"))
        .expect(1)
        .mount(&server)
        .await;

    speaker(&server).play().await.unwrap();
}

#[tokio::test]
async fn transport_returns_raw_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AV_PATH))
        .respond_with(ok_response("Stop"))
        .mount(&server)
        .await;

    let address = SpeakerAddress::with_port("127.0.0.1", server.address().port());
    let body = send_soap_request(
        &Client::new(),
        &address,
        AV_PATH,
        AV_TRANSPORT,
        "Stop",
        &[("InstanceID", "0")],
    )
    .await
    .unwrap();

    assert!(body.contains("StopResponse"));
}

#[tokio::test]
async fn load_track_sends_escaped_uri_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AV_PATH))
        .and(body_string_contains(
            "<CurrentURI>x-sonos-spotify:spotify%3Atrack%3Aabc123?sid=12&amp;flags=8224&amp;sn=7</CurrentURI>",
        ))
        .and(body_string_contains("<CurrentURIMetaData>&lt;DIDL-Lite"))
        .and(body_string_contains("Rock &amp;amp; Roll"))
        .respond_with(ok_response("SetAVTransportURI"))
        .expect(1)
        .mount(&server)
        .await;

    let track = TrackReference::parse("spotify:track:abc123").unwrap();
    let metadata = TrackMetadata {
        title: Some("Rock & Roll".into()),
        ..TrackMetadata::default()
    };
    speaker(&server).load_track(&track, &metadata).await.unwrap();
}

#[tokio::test]
async fn set_volume_targets_rendering_control_without_clamping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RC_PATH))
        .and(header(
            "soapaction",
            "\"urn:schemas-upnp-org:service:RenderingControl:1#SetVolume\"",
        ))
        .and(body_string_contains(
            "<Channel>Master</Channel><DesiredVolume>150</DesiredVolume>",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    speaker(&server).set_volume(150).await.unwrap();
}

#[tokio::test]
async fn transport_info_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AV_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:GetTransportInfoResponse xmlns:u="{AV_TRANSPORT}"><CurrentTransportState>PLAYING</CurrentTransportState><CurrentTransportStatus>OK</CurrentTransportStatus><CurrentSpeed>1</CurrentSpeed></u:GetTransportInfoResponse></s:Body></s:Envelope>"#
        )))
        .mount(&server)
        .await;

    let client = speaker(&server);
    let info = client.get_transport_state().await.unwrap();
    assert_eq!(info.raw_state, "PLAYING");
    assert_eq!(info.state, Some(TransportState::Playing));
    assert_eq!(info.status.as_deref(), Some("OK"));
    assert!(client.test_connectivity().await);
}

#[tokio::test]
async fn http_error_without_fault_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = speaker(&server).pause().await.unwrap_err();
    match err {
        SoapError::HttpStatus(status, body) => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn soap_fault_reports_upnp_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>701</errorCode></UPnPError></detail></s:Fault></s:Body></s:Envelope>"#,
        ))
        .mount(&server)
        .await;

    let err = speaker(&server).play().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    match err {
        SoapError::Fault(_, message) => assert_eq!(message, "UPnPError (errorCode 701)"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_speaker_is_a_transport_error() {
    // Nothing listens on port 1.
    let client = SpeakerClient::new(Client::new(), SpeakerAddress::with_port("127.0.0.1", 1));
    let err = client.stop().await.unwrap_err();
    assert!(matches!(err, SoapError::Http(_)));
    assert!(!client.test_connectivity().await);
}
