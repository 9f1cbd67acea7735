//! Events endpoint tests against a live server on a random port

use aqi_duck::{
    actors::controller::ControllerHandle,
    api::{EventsState, routes::events::RETRY_HEADER, spawn_events_server},
    controller::{Controller, GREETING},
};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::helpers::*;

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    handles: Vec<ControllerHandle>,
    channels: Vec<Arc<RecordingChannel>>,
}

impl TestServer {
    fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    async fn post_event(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/slack/events"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Wait until every controller has worked through its queue.
    async fn settle(&self) {
        for handle in &self.handles {
            handle.state().await.unwrap();
        }
    }
}

async fn spawn_test_server(verification_token: Option<&str>) -> TestServer {
    let channels = vec![
        RecordingChannel::new("CA", "channel-a", Some("Config A")),
        RecordingChannel::new("CB", "channel-b", Some("Config B")),
    ];

    let mut handles = Vec::new();
    for channel in &channels {
        let mut controller = Controller::new(channel.clone()).with_interval(TEST_INTERVAL);
        controller.configure(&MockFactory).await.unwrap();
        handles.push(ControllerHandle::spawn(controller));
    }

    let state = EventsState::new(
        handles.iter().cloned(),
        verification_token.map(str::to_string),
    );
    let addr = spawn_events_server("127.0.0.1:0".parse().unwrap(), state)
        .await
        .unwrap();

    TestServer {
        addr,
        client: reqwest::Client::new(),
        handles,
        channels,
    }
}

fn mention(channel: &str, text: &str, token: &str) -> Value {
    json!({
        "token": token,
        "type": "event_callback",
        "event": {
            "type": "app_mention",
            "user": "U061F7AUR",
            "text": text,
            "channel": channel,
            "ts": "1515449522.000016"
        }
    })
}

#[tokio::test]
async fn test_url_verification_echoes_challenge() {
    let server = spawn_test_server(Some("secret")).await;

    let response = server
        .post_event(json!({
            "token": "secret",
            "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
            "type": "url_verification"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["challenge"],
        "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
    );
}

#[tokio::test]
async fn test_mentions_are_routed_by_channel() {
    let server = spawn_test_server(None).await;

    let response = server
        .post_event(mention("CA", "<@U0LAN0Z89> report", "any"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server
        .post_event(mention("CB", "<@U0LAN0Z89> hello", "any"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    server.settle().await;

    assert_eq!(server.channels[0].take(), vec![report_for("Config A")]);
    assert_eq!(server.channels[1].take(), vec![GREETING.to_string()]);
}

#[tokio::test]
async fn test_unknown_channel_is_acknowledged() {
    let server = spawn_test_server(None).await;

    let response = server
        .post_event(mention("CZ", "<@U0LAN0Z89> report", "any"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    server.settle().await;
    assert!(server.channels.iter().all(|c| c.messages().is_empty()));
}

#[tokio::test]
async fn test_undeliverable_mention_is_acknowledged() {
    let server = spawn_test_server(None).await;

    server.handles[0].shutdown().await.unwrap();
    assert!(server.handles[0].state().await.is_err());

    let response = server
        .post_event(mention("CA", "<@U0LAN0Z89> report", "any"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.channels[0].messages().is_empty());
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let server = spawn_test_server(Some("secret")).await;

    let response = server
        .post_event(mention("CA", "<@U0LAN0Z89> report", "wrong"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .post_event(json!({ "type": "url_verification", "challenge": "c" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    server.settle().await;
    assert!(server.channels[0].messages().is_empty());
}

#[tokio::test]
async fn test_redelivered_mentions_are_ignored() {
    let server = spawn_test_server(None).await;

    let response = server
        .client
        .post(server.url("/slack/events"))
        .header(RETRY_HEADER, "1")
        .json(&mention("CA", "<@U0LAN0Z89> report", "any"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.settle().await;
    assert!(server.channels[0].messages().is_empty());
}

#[tokio::test]
async fn test_unsupported_events_are_acknowledged() {
    let server = spawn_test_server(None).await;

    let response = server
        .post_event(json!({
            "type": "event_callback",
            "event": { "type": "reaction_added", "reaction": "duck" }
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.post_event(json!({ "type": "app_rate_limited" })).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_channels() {
    let server = spawn_test_server(None).await;

    let health: Value = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["channels"], 2);

    server.handles[1].start_monitoring().await.unwrap();

    let channels: Value = server
        .client
        .get(server.url("/channels"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        channels,
        json!({
            "channels": [
                { "id": "CA", "name": "channel-a", "state": "idle" },
                { "id": "CB", "name": "channel-b", "state": "running" }
            ]
        })
    );

    for handle in &server.handles {
        handle.shutdown().await.unwrap();
    }
}
