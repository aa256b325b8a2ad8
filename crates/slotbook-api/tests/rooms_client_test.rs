#![allow(clippy::unwrap_used)]
// Integration tests for `RoomClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slotbook_api::{
    Error, RoomClient, RoomKind, RoomProfiles, RoomRole, RoomTemplate, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn profiles() -> RoomProfiles {
    RoomProfiles {
        audio: RoomTemplate {
            template_id: "tpl-audio".into(),
            subdomain: "talk".into(),
        },
        video: RoomTemplate {
            template_id: "tpl-video".into(),
            subdomain: "meet".into(),
        },
    }
}

async fn setup() -> (MockServer, RoomClient) {
    let server = MockServer::start().await;
    let client = RoomClient::with_client(reqwest::Client::new(), &server.uri(), profiles()).unwrap();
    (server, client)
}

async fn mount_code(server: &MockServer, room_id: &str, role: &str, code: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v2/room-codes/room/{room_id}/role/{role}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": code, "role": role })),
        )
        .mount(server)
        .await;
}

// ── Room creation ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_room_sends_template_for_kind() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .and(body_partial_json(json!({
            "name": "slot-booking-1",
            "description": "Mentorship Session",
            "template_id": "tpl-audio"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "room-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let room = client
        .create_room(RoomKind::Audio, "slot-booking-1")
        .await
        .unwrap();
    assert_eq!(room.id, "room-1");
}

#[tokio::test]
async fn test_create_room_code() {
    let (server, client) = setup().await;
    mount_code(&server, "room-9", "guest", "gst-code").await;

    let code = client
        .create_room_code("room-9", RoomRole::Guest)
        .await
        .unwrap();
    assert_eq!(code.code, "gst-code");
}

// ── Full provisioning ───────────────────────────────────────────────

#[tokio::test]
async fn test_provision_builds_join_urls() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "room-42", "name": "slot-booking-7" })),
        )
        .mount(&server)
        .await;
    mount_code(&server, "room-42", "host", "host-abc").await;
    mount_code(&server, "room-42", "guest", "guest-xyz").await;

    let room = client
        .provision(RoomKind::Video, "slot-booking-7")
        .await
        .unwrap();

    assert_eq!(room.room_id, "room-42");
    assert_eq!(room.name, "slot-booking-7");
    assert_eq!(room.host_code, "host-abc");
    assert_eq!(room.guest_code, "guest-xyz");
    assert_eq!(room.host_url, "https://meet.app.100ms.live/meeting/host-abc");
    assert_eq!(room.guest_url, "https://meet.app.100ms.live/meeting/guest-xyz");
}

#[tokio::test]
async fn test_provision_fails_when_code_minting_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "room-5" })))
        .mount(&server)
        .await;
    mount_code(&server, "room-5", "host", "host-ok").await;
    Mock::given(method("POST"))
        .and(path("/v2/room-codes/room/room-5/role/guest"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "code service down", "code": "internal" })),
        )
        .mount(&server)
        .await;

    let result = client.provision(RoomKind::Audio, "slot-booking-5").await;
    match result {
        Err(Error::Api {
            status,
            message,
            code,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "code service down");
            assert_eq!(code.as_deref(), Some("internal"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.create_room(RoomKind::Video, "r").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let result = client.create_room(RoomKind::Video, "r").await;
    assert!(
        matches!(result, Err(Error::RateLimited { retry_after_secs: 30 })),
        "expected RateLimited error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.create_room(RoomKind::Audio, "r").await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_sent_as_bearer() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "mgmt-token".to_string().into();
    let client = RoomClient::new(
        &server.uri(),
        &token,
        profiles(),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/v2/rooms"))
        .and(header("authorization", "Bearer mgmt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "room-b" })))
        .expect(1)
        .mount(&server)
        .await;

    let room = client.create_room(RoomKind::Video, "r").await.unwrap();
    assert_eq!(room.id, "room-b");
}
