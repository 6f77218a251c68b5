//! Call session state machine
//!
//! Client-resident contract for one peer call. The session owns media
//! acquisition (with audio-only degradation), peer connection setup with
//! bounded retry, and teardown. Media and transport are injected through
//! the traits in [`capabilities`], so the machine is testable without a
//! real WebRTC stack.
//!
//! Phase graph:
//!
//! ```text
//! Idle -> AcquiringMedia -> MediaReady  -> Connecting -> Connected -> Closed
//!                        \> MediaFailed -> Closed      \> ConnectionFailed
//!                                                          (retry or Closed)
//! ```

pub mod capabilities;
pub mod config;
pub mod error;
pub mod manager;

pub use capabilities::{
    MediaConstraints, MediaSource, MediaTracks, PeerConnector, PeerEvent, PeerHandle, SignalOutbox,
};
pub use config::RetryPolicy;
pub use error::SessionError;
pub use manager::CallSession;

use serde::{Deserialize, Serialize};

/// Observable lifecycle phase of a call session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallPhase {
    Idle,
    AcquiringMedia,
    MediaReady,
    MediaFailed,
    Connecting,
    Connected,
    ConnectionFailed,
    Closed,
}

impl CallPhase {
    /// Terminal phases never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Which side of the call this session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallRole {
    Initiator,
    Responder,
}
