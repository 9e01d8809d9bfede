//! Live WebSocket integration tests.
//!
//! These spin up the real server on an ephemeral port and drive it with a
//! WebSocket client plus plain HTTP event submissions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use pricewire::api;
use pricewire::realtime::RealtimeHub;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

mod common;
use common::{test_state, test_validator};

async fn spawn_server() -> (SocketAddr, Arc<RealtimeHub>) {
    let (state, hub) = test_state();
    let app = api::create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hub)
}

async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// Read frames until the next text frame, skipping keepalive traffic.
async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("transport error");
        match message {
            Message::Text(text) => return text.to_string(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

fn assert_rejected(err: WsError, status: u16, code: &str) {
    match err {
        WsError::Http(response) => {
            assert_eq!(response.status().as_u16(), status);
            if let Some(body) = response.body() {
                let value: Value = serde_json::from_slice(body).unwrap();
                assert_eq!(value["code"], code);
            }
        }
        other => panic!("expected an HTTP rejection, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_feed_broadcast_end_to_end() {
    let (addr, hub) = spawn_server().await;

    let (mut feed, _response) = connect_async(format!("ws://{addr}/ws/feed"))
        .await
        .expect("feed connection admits unconditionally");
    wait_until(|| hub.feed_connection_count() == 1).await;

    let payload = json!([
        {"id": "bitcoin", "symbol": "btc", "price": 102809.0},
        {"id": "ethereum", "symbol": "eth", "price": 3187.37}
    ]);
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .json(&json!({"kind": "crypto_update_eur", "payload": payload}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let frame: Value = serde_json::from_str(&next_text(&mut feed).await).unwrap();
    assert_eq!(frame["type"], "price_update");
    assert_eq!(frame["channel"], "broadcastEUR");
    assert_eq!(frame["payload"], payload);
    assert!(frame["timestamp"].is_string());
}

#[tokio::test]
async fn test_user_channel_rejects_missing_credential() {
    let (addr, _hub) = spawn_server().await;

    let err = connect_async(format!("ws://{addr}/ws/user"))
        .await
        .unwrap_err();
    assert_rejected(err, 401, "MISSING_CREDENTIAL");
}

#[tokio::test]
async fn test_user_channel_rejects_invalid_token() {
    let (addr, _hub) = spawn_server().await;

    let mut request = format!("ws://{addr}/ws/user").into_client_request().unwrap();
    request
        .headers_mut()
        .insert(COOKIE, "auth_token=bogus".parse().unwrap());

    let err = connect_async(request).await.unwrap_err();
    assert_rejected(err, 401, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_user_channel_delivers_targeted_notifications() {
    let (addr, hub) = spawn_server().await;

    let token = test_validator().issue_token("u1", 3600).unwrap();
    let mut request = format!("ws://{addr}/ws/user").into_client_request().unwrap();
    request
        .headers_mut()
        .insert(COOKIE, format!("auth_token={token}").parse().unwrap());

    let (mut user_ws, _response) = connect_async(request)
        .await
        .expect("valid credential is admitted");
    wait_until(|| hub.is_user_bound("u1")).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .json(&json!({
            "kind": "user_notification",
            "payload": {
                "userId": "u1",
                "cryptoId": "bitcoin",
                "alertPrice": "40000",
                "currentPrice": "41000",
                "alertType": "ABOVE"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let frame: Value = serde_json::from_str(&next_text(&mut user_ws).await).unwrap();
    assert_eq!(frame["type"], "notification");
    let message = frame["message"].as_str().unwrap();
    assert!(message.contains("bitcoin"));
    assert!(message.contains("surpassed"));
}

#[tokio::test]
async fn test_reconnect_supersedes_previous_session() {
    let (addr, hub) = spawn_server().await;

    let token = test_validator().issue_token("u1", 3600).unwrap();
    let cookie = format!("auth_token={token}");

    let mut first = format!("ws://{addr}/ws/user").into_client_request().unwrap();
    first.headers_mut().insert(COOKIE, cookie.parse().unwrap());
    let (_first_ws, _) = connect_async(first).await.unwrap();
    wait_until(|| hub.is_user_bound("u1")).await;
    let first_conn = hub.bound_connection("u1").unwrap();

    let mut second = format!("ws://{addr}/ws/user").into_client_request().unwrap();
    second.headers_mut().insert(COOKIE, cookie.parse().unwrap());
    let (mut second_ws, _) = connect_async(second).await.unwrap();
    wait_until(|| hub.bound_connection("u1") != Some(first_conn)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .json(&json!({
            "kind": "user_notification",
            "payload": {"userId": "u1", "message": "for the newest session"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let frame: Value = serde_json::from_str(&next_text(&mut second_ws).await).unwrap();
    assert_eq!(frame["message"], "for the newest session");
}
