//! Realtime hub: owns the public feed connections and the identity bindings.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info, warn};
use pricewire_protocol::{FeedChannel, PriceUpdate, ServerFrame, UserNotice};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::delivery::{Delivery, DeliveryError};

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// Opaque token identifying one transport connection.
pub type ConnectionId = Uuid;

/// A sender for frames to a specific connection.
type FrameSender = mpsc::Sender<ServerFrame>;

/// One authenticated user's live connection.
///
/// The binding is immutable once created; a reconnect replaces the whole
/// entry rather than mutating it.
struct UserBinding {
    conn_id: ConnectionId,
    tx: FrameSender,
}

/// Realtime hub managing both channel classes.
///
/// The hub is responsible for:
/// - Tracking public feed connections (no identity required)
/// - The identity-binding table: user id -> at most one live connection
/// - Broadcast and targeted delivery
///
/// Both tables are keyed maps with per-key atomic updates, so binds and
/// removals for the same user never interleave mid-operation.
pub struct RealtimeHub {
    /// Set once both channel classes are open for delivery.
    open: AtomicBool,

    /// Connection ID -> public feed sender.
    feed: DashMap<ConnectionId, FrameSender>,

    /// User ID -> that user's single live authenticated connection.
    bindings: DashMap<String, UserBinding>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            feed: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    /// One-time setup of both channel classes. Idempotent: calling it again
    /// is a no-op.
    pub fn open(&self) {
        if !self.open.swap(true, Ordering::SeqCst) {
            info!("realtime hub open: feed and user channels accepting deliveries");
        }
    }

    fn ensure_open(&self) -> Result<(), DeliveryError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DeliveryError::NotInitialized)
        }
    }

    /// Register a new public feed connection.
    ///
    /// Returns the connection's id and the receiver its session loop drains.
    pub fn register_feed(&self) -> (ConnectionId, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        let conn_id = Uuid::new_v4();
        self.feed.insert(conn_id, tx);
        info!("registered feed connection {conn_id}");
        (conn_id, rx)
    }

    /// Drop a public feed connection.
    pub fn remove_feed(&self, conn_id: ConnectionId) {
        if self.feed.remove(&conn_id).is_some() {
            info!("removed feed connection {conn_id}");
        }
    }

    /// Bind an authenticated connection to `user_id`.
    ///
    /// Last-connect-wins: any previous binding for the user is replaced, and
    /// dropping its sender ends the superseded session's receive loop.
    pub fn bind_user(&self, user_id: &str) -> (ConnectionId, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        let conn_id = Uuid::new_v4();
        let previous = self
            .bindings
            .insert(user_id.to_string(), UserBinding { conn_id, tx });
        match previous {
            Some(old) => info!(
                "rebound user {user_id} to connection {conn_id} (superseding {})",
                old.conn_id
            ),
            None => info!("bound user {user_id} to connection {conn_id}"),
        }
        (conn_id, rx)
    }

    /// Remove the binding for `user_id` iff it still points at `conn_id`.
    ///
    /// A disconnect handler for a superseded connection must not evict the
    /// newer session; the compare happens atomically with concurrent binds
    /// and removals for the same user.
    pub fn release_user(&self, user_id: &str, conn_id: ConnectionId) {
        let removed = self
            .bindings
            .remove_if(user_id, |_, binding| binding.conn_id == conn_id);
        if removed.is_some() {
            info!("released user {user_id} (connection {conn_id})");
        } else {
            debug!("skipped release for user {user_id}: connection {conn_id} was superseded");
        }
    }

    /// Whether `user_id` currently has a live bound connection.
    pub fn is_user_bound(&self, user_id: &str) -> bool {
        self.bindings.contains_key(user_id)
    }

    /// Connection id currently bound for `user_id`, if any.
    pub fn bound_connection(&self, user_id: &str) -> Option<ConnectionId> {
        self.bindings.get(user_id).map(|binding| binding.conn_id)
    }

    /// Number of live public feed connections.
    pub fn feed_connection_count(&self) -> usize {
        self.feed.len()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Delivery for RealtimeHub {
    async fn broadcast(
        &self,
        channel: FeedChannel,
        update: PriceUpdate,
    ) -> Result<(), DeliveryError> {
        self.ensure_open()?;

        let frame = ServerFrame::price_update(channel, update);

        // Snapshot the senders so no map guard is held across sends.
        let senders: Vec<(ConnectionId, FrameSender)> = self
            .feed
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0usize;
        for (conn_id, tx) in senders {
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("feed connection {conn_id} is lagging, dropping update");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("feed connection {conn_id} closed mid-broadcast");
                }
            }
        }

        debug!("broadcast {channel:?} update to {delivered} feed connection(s)");
        Ok(())
    }

    async fn send_to_user(&self, user_id: &str, notice: UserNotice) -> Result<(), DeliveryError> {
        self.ensure_open()?;

        // Clone the sender out of the guard before awaiting.
        let Some(tx) = self.bindings.get(user_id).map(|binding| binding.tx.clone()) else {
            debug!("no live connection for user {user_id}, dropping notice");
            return Ok(());
        };

        if tx.send(ServerFrame::notification(notice)).await.is_err() {
            // The connection raced a disconnect; best-effort, not an error.
            debug!("user {user_id} disconnected before the notice arrived");
        }

        Ok(())
    }
}
