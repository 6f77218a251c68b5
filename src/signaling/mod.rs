//! Peer-call signaling relay
//!
//! Forwards opaque signaling payloads (SDP offers/answers, ICE candidates)
//! between user channels without inspecting or storing them. Call lifecycle
//! messages (request, response, hangup) ride the same path, distinguished
//! only by their event type on the wire.
//!
//! Delivery is fire-and-forget: if the destination user has no connection
//! the envelope is dropped silently. Callers never learn whether delivery
//! happened, matching the at-most-once semantics of the transport.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::handlers::ws::messages::ServerEvent;
use crate::rooms::RoomRegistry;

/// One signaling message in flight between two users
///
/// `signal` is opaque to the server: relayed verbatim, never validated,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEnvelope {
    pub from: String,
    pub to: String,
    pub signal: Value,
}

/// Stateless relay over the room registry
pub struct SignalingRelay {
    rooms: Arc<RoomRegistry>,
}

impl SignalingRelay {
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// Forward a signaling payload to the destination user's channel
    pub fn relay(&self, envelope: SignalEnvelope) {
        let delivered = self.rooms.send_to_user(
            &envelope.to,
            &ServerEvent::VideoCallSignal {
                signal: envelope.signal,
                from: envelope.from,
                to: envelope.to.clone(),
            },
        );
        if delivered == 0 {
            debug!(to = %envelope.to, "signal dropped, destination not connected");
        }
    }

    /// Deliver a call invitation to the callee
    pub fn request_call(&self, from: &str, to: &str) {
        let delivered = self.rooms.send_to_user(
            to,
            &ServerEvent::VideoCallRequest {
                from: from.to_string(),
                to: to.to_string(),
            },
        );
        if delivered == 0 {
            debug!(%to, "call request dropped, destination not connected");
        }
    }

    /// Deliver the callee's accept/decline decision back to the caller
    pub fn respond_call(&self, from: &str, to: &str, accepted: bool) {
        let delivered = self.rooms.send_to_user(
            to,
            &ServerEvent::VideoCallResponse {
                from: from.to_string(),
                to: to.to_string(),
                accepted,
            },
        );
        if delivered == 0 {
            debug!(%to, "call response dropped, destination not connected");
        }
    }

    /// Tell the remote side the call is over so it can close its session
    pub fn end_call(&self, from: &str, to: &str) {
        let delivered = self.rooms.send_to_user(
            to,
            &ServerEvent::VideoCallEnded {
                from: from.to_string(),
                to: to.to_string(),
            },
        );
        if delivered == 0 {
            debug!(%to, "call end dropped, destination not connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::rooms::Channel;

    fn connected_user(registry: &Arc<RoomRegistry>, user_id: &str) -> mpsc::Receiver<ServerEvent> {
        let conn = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(8);
        registry.register(conn, tx);
        registry.join(conn, Channel::user(user_id));
        rx
    }

    #[test]
    fn relay_preserves_payload_and_sender() {
        let rooms = Arc::new(RoomRegistry::new());
        let relay = SignalingRelay::new(rooms.clone());
        let mut rx = connected_user(&rooms, "bob");

        let payload = json!({"type": "offer", "sdp": "v=0..."});
        relay.relay(SignalEnvelope {
            from: "alice".into(),
            to: "bob".into(),
            signal: payload.clone(),
        });

        match rx.try_recv().unwrap() {
            ServerEvent::VideoCallSignal { signal, from, to } => {
                assert_eq!(signal, payload);
                assert_eq!(from, "alice");
                assert_eq!(to, "bob");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_destination_is_silently_dropped() {
        let rooms = Arc::new(RoomRegistry::new());
        let relay = SignalingRelay::new(rooms.clone());
        let mut rx = connected_user(&rooms, "alice");

        relay.relay(SignalEnvelope {
            from: "alice".into(),
            to: "nobody".into(),
            signal: json!({"candidate": "..."}),
        });

        // Sender receives no error and no echo.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn call_lifecycle_events_reach_the_counterpart() {
        let rooms = Arc::new(RoomRegistry::new());
        let relay = SignalingRelay::new(rooms.clone());
        let mut caller = connected_user(&rooms, "alice");
        let mut callee = connected_user(&rooms, "bob");

        relay.request_call("alice", "bob");
        assert!(matches!(
            callee.try_recv().unwrap(),
            ServerEvent::VideoCallRequest { .. }
        ));

        relay.respond_call("bob", "alice", true);
        match caller.try_recv().unwrap() {
            ServerEvent::VideoCallResponse { accepted, from, .. } => {
                assert!(accepted);
                assert_eq!(from, "bob");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        relay.end_call("alice", "bob");
        assert!(matches!(
            callee.try_recv().unwrap(),
            ServerEvent::VideoCallEnded { .. }
        ));
    }
}
