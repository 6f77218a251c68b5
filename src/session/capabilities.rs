//! Injected capabilities for the call session
//!
//! The session state machine never touches a real media or WebRTC stack.
//! Hosts provide these traits; tests provide fakes.

use async_trait::async_trait;
use serde_json::Value;

use super::error::SessionError;
use super::CallRole;

/// What the session asks the media layer for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    pub fn audio_and_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }

    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }
}

/// Live local tracks handed to the peer transport
///
/// Toggles mutate the underlying tracks in place and survive peer
/// reconnects, so a muted call stays muted across a retry.
pub trait MediaTracks: Send + Sync {
    fn set_audio_enabled(&self, enabled: bool);
    fn set_video_enabled(&self, enabled: bool);
    fn has_video(&self) -> bool;
}

/// Source of local media tracks
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaTracks>, SessionError>;
}

/// Events surfaced by a peer transport
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    /// Locally generated signaling payload that must reach the remote side
    Signal(Value),
    /// First remote media arrived
    RemoteStream,
    /// Transport-level connectivity established
    TransportConnected,
    /// Transport gave up; the session decides whether to retry
    TransportFailed,
}

/// One live peer transport attempt
#[async_trait]
pub trait PeerHandle: Send {
    /// Feed a remote signaling payload into the transport
    async fn apply_signal(&mut self, signal: Value) -> Result<(), SessionError>;

    /// Next transport event; `None` once the transport is torn down
    async fn next_event(&mut self) -> Option<PeerEvent>;

    async fn close(&mut self);
}

/// Builds a fresh peer transport per connection attempt
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        role: CallRole,
        tracks: &dyn MediaTracks,
    ) -> Result<Box<dyn PeerHandle>, SessionError>;
}

/// Outbound path for envelopes the session needs relayed to the remote user
#[async_trait]
pub trait SignalOutbox: Send + Sync {
    async fn send_signal(&self, to: &str, signal: Value);
    async fn send_hangup(&self, to: &str);
}
