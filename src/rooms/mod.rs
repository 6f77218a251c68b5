//! Channel membership and fan-out
//!
//! The registry maps logical channels to the WebSocket connections currently
//! subscribed to them. Two channel families exist:
//!
//! - `user:<userId>` for direct, per-user delivery (call signals, position
//!   updates, patient-called notifications)
//! - `queue:<doctorId>:<hospitalId>` for queue-wide broadcasts
//!
//! Delivery is non-blocking. Each connection registers a bounded mpsc sender
//! and a slow consumer that fills its queue is dropped and unregistered
//! rather than stalling everyone else on the channel.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::handlers::ws::messages::ServerEvent;
use crate::queue::QueueKey;

/// Identifier for one WebSocket connection
pub type ConnId = Uuid;

/// Outbound events buffered per connection before the socket writer drains
/// them. A full buffer marks the connection as dead.
pub const SEND_QUEUE_CAPACITY: usize = 64;

/// Logical broadcast channel name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel(String);

impl Channel {
    /// Direct channel for one user
    pub fn user(user_id: &str) -> Self {
        Self(format!("user:{user_id}"))
    }

    /// Broadcast channel for one doctor's queue at one facility
    pub fn queue(key: &QueueKey) -> Self {
        Self(format!("queue:{}:{}", key.doctor_id, key.hospital_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
struct Inner {
    /// Per-connection outbound sender
    senders: HashMap<ConnId, mpsc::Sender<ServerEvent>>,
    /// Channel name -> member connections
    channels: HashMap<Channel, HashSet<ConnId>>,
    /// Reverse index for O(channels-of-conn) cleanup on disconnect
    memberships: HashMap<ConnId, HashSet<Channel>>,
}

/// Shared channel membership registry
///
/// Held in `AppState`; cheap to clone behind an `Arc`. All methods are
/// synchronous and lock-scoped, safe to call from async context.
#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<Inner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound sender. Must precede any `join`.
    pub fn register(&self, conn: ConnId, sender: mpsc::Sender<ServerEvent>) {
        let mut inner = self.inner.write();
        inner.senders.insert(conn, sender);
        inner.memberships.entry(conn).or_default();
    }

    /// Subscribe a connection to a channel. Joining twice is a no-op.
    pub fn join(&self, conn: ConnId, channel: Channel) {
        let mut inner = self.inner.write();
        if !inner.senders.contains_key(&conn) {
            warn!(%conn, %channel, "join from unregistered connection ignored");
            return;
        }
        inner.channels.entry(channel.clone()).or_default().insert(conn);
        inner.memberships.entry(conn).or_default().insert(channel);
    }

    /// Unsubscribe a connection from a channel. Leaving a channel the
    /// connection never joined is a no-op.
    pub fn leave(&self, conn: ConnId, channel: &Channel) {
        let mut inner = self.inner.write();
        if let Some(members) = inner.channels.get_mut(channel) {
            members.remove(&conn);
            if members.is_empty() {
                inner.channels.remove(channel);
            }
        }
        if let Some(chans) = inner.memberships.get_mut(&conn) {
            chans.remove(channel);
        }
    }

    /// Remove a connection from every channel and drop its sender.
    ///
    /// Called from the socket handler's cleanup path on any disconnect.
    pub fn remove_connection(&self, conn: ConnId) {
        let mut inner = self.inner.write();
        inner.senders.remove(&conn);
        if let Some(chans) = inner.memberships.remove(&conn) {
            for channel in chans {
                if let Some(members) = inner.channels.get_mut(&channel) {
                    members.remove(&conn);
                    if members.is_empty() {
                        inner.channels.remove(&channel);
                    }
                }
            }
        }
    }

    /// Deliver an event to every member of a channel.
    ///
    /// Members whose outbound queue is full are unregistered; dropping their
    /// sender closes the socket writer task. Returns the number of members
    /// the event was queued for.
    pub fn broadcast(&self, channel: &Channel, event: &ServerEvent) -> usize {
        let mut failed: Vec<ConnId> = Vec::new();
        let mut delivered = 0;
        {
            let inner = self.inner.read();
            let Some(members) = inner.channels.get(channel) else {
                debug!(%channel, "broadcast to empty channel");
                return 0;
            };
            for conn in members {
                match inner.senders.get(conn) {
                    Some(sender) => match sender.try_send(event.clone()) {
                        Ok(()) => delivered += 1,
                        Err(_) => failed.push(*conn),
                    },
                    None => failed.push(*conn),
                }
            }
        }
        for conn in failed {
            warn!(%conn, %channel, "outbound queue full, dropping connection");
            self.remove_connection(conn);
        }
        delivered
    }

    /// Deliver an event to one user's direct channel
    pub fn send_to_user(&self, user_id: &str, event: &ServerEvent) -> usize {
        self.broadcast(&Channel::user(user_id), event)
    }

    /// Number of connections currently subscribed to a channel
    pub fn member_count(&self, channel: &Channel) -> usize {
        self.inner
            .read()
            .channels
            .get(channel)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}
