//! WebSocket session loops for both channel classes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use pricewire_protocol::ServerFrame;
use tokio::sync::mpsc;

use super::hub::RealtimeHub;

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// Drive a public feed connection until the client goes away.
///
/// The feed is server-to-client only: inbound frames other than close are
/// ignored. The connection is registered for the whole lifetime of the loop
/// and removed on the way out.
pub async fn run_feed_session(socket: WebSocket, hub: Arc<RealtimeHub>) {
    let (conn_id, frames) = hub.register_feed();
    let (sender, receiver) = socket.split();

    pump_frames(sender, receiver, frames, &format!("feed connection {conn_id}")).await;

    hub.remove_feed(conn_id);
    info!("feed connection {conn_id} closed");
}

/// Drive an authenticated user connection until the client goes away or the
/// binding is superseded by a newer session for the same user.
///
/// The binding is released only if it still points at this connection, so a
/// late disconnect never evicts a newer session.
pub async fn run_user_session(socket: WebSocket, hub: Arc<RealtimeHub>, user_id: String) {
    let (conn_id, frames) = hub.bind_user(&user_id);
    let (sender, receiver) = socket.split();

    pump_frames(
        sender,
        receiver,
        frames,
        &format!("user {user_id} connection {conn_id}"),
    )
    .await;

    hub.release_user(&user_id, conn_id);
    info!("user {user_id} connection {conn_id} closed");
}

/// Shared send/receive loop: forward hub frames as JSON text, answer the
/// clock with pings, and bail out on close or transport error.
///
/// Returns when the hub drops the frame sender (the binding was replaced),
/// the client closes, or a write fails.
async fn pump_frames(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    mut frames: mpsc::Receiver<ServerFrame>,
    who: &str,
) {
    let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));

    loop {
        tokio::select! {
            maybe_frame = frames.recv() => {
                let Some(frame) = maybe_frame else {
                    debug!("{who}: frame channel closed, ending session");
                    break;
                };
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!("{who}: failed to serialize frame: {err}");
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Keepalive traffic; pongs are produced by axum.
                    }
                    Some(Ok(_)) => {
                        // Both channels are server-to-client only.
                        debug!("{who}: ignoring inbound message");
                    }
                    Some(Err(err)) => {
                        warn!("{who}: transport error: {err}");
                        break;
                    }
                }
            }

            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }
}
