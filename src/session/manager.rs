//! Call session driver
//!
//! One spawned task owns the whole call lifecycle: media acquisition, peer
//! connection attempts with backoff, signal pumping in both directions and
//! teardown. The public [`CallSession`] handle is command-based; dropping
//! it aborts the driver so no stale retry timer ever fires after teardown.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::capabilities::{
    MediaConstraints, MediaSource, MediaTracks, PeerConnector, PeerEvent, SignalOutbox,
};
use super::config::RetryPolicy;
use super::{CallPhase, CallRole};

enum Command {
    /// Remote signaling payload to feed into the peer transport
    Signal(Value),
    SetMuted(bool),
    SetCameraEnabled(bool),
    /// Local user ended the call; the remote side must be told
    Hangup,
    /// Remote side ended the call; close without echoing a hangup
    RemoteClosed,
}

enum Attempt {
    /// Call ended normally from the local side
    HangupLocal,
    /// Call ended normally from the remote side or handle drop
    Finished,
    /// Transport lost or never established; candidate for retry
    TransportLost,
}

/// Handle to one running call session
pub struct CallSession {
    remote_id: String,
    role: CallRole,
    phase_rx: watch::Receiver<CallPhase>,
    commands: mpsc::UnboundedSender<Command>,
    driver: JoinHandle<()>,
}

impl CallSession {
    /// Spawn the session driver and begin media acquisition immediately
    pub fn start(
        local_id: impl Into<String>,
        remote_id: impl Into<String>,
        role: CallRole,
        media: Arc<dyn MediaSource>,
        connector: Arc<dyn PeerConnector>,
        outbox: Arc<dyn SignalOutbox>,
        retry: RetryPolicy,
    ) -> Self {
        let remote_id = remote_id.into();
        let (phase_tx, phase_rx) = watch::channel(CallPhase::Idle);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            local_id: local_id.into(),
            remote_id: remote_id.clone(),
            role,
            media,
            connector,
            outbox,
            retry,
            phase: phase_tx,
            commands: cmd_rx,
        };
        let handle = tokio::spawn(driver.run());

        Self {
            remote_id,
            role,
            phase_rx,
            commands: cmd_tx,
            driver: handle,
        }
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn role(&self) -> CallRole {
        self.role
    }

    /// Current phase
    pub fn phase(&self) -> CallPhase {
        *self.phase_rx.borrow()
    }

    /// Watch every phase transition
    pub fn phases(&self) -> watch::Receiver<CallPhase> {
        self.phase_rx.clone()
    }

    /// Feed a signaling payload received from the remote side
    pub fn deliver_signal(&self, signal: Value) {
        let _ = self.commands.send(Command::Signal(signal));
    }

    /// Toggle the local audio track. Never changes phase.
    pub fn set_muted(&self, muted: bool) {
        let _ = self.commands.send(Command::SetMuted(muted));
    }

    /// Toggle the local video track. Never changes phase.
    pub fn set_camera_enabled(&self, enabled: bool) {
        let _ = self.commands.send(Command::SetCameraEnabled(enabled));
    }

    /// End the call locally. The remote side is notified through the
    /// outbox. Safe to call more than once.
    pub fn hangup(&self) {
        let _ = self.commands.send(Command::Hangup);
    }

    /// The remote side ended the call; close without echoing a hangup
    pub fn close_remote(&self) {
        let _ = self.commands.send(Command::RemoteClosed);
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

struct Driver {
    local_id: String,
    remote_id: String,
    role: CallRole,
    media: Arc<dyn MediaSource>,
    connector: Arc<dyn PeerConnector>,
    outbox: Arc<dyn SignalOutbox>,
    retry: RetryPolicy,
    phase: watch::Sender<CallPhase>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Driver {
    async fn run(mut self) {
        self.set_phase(CallPhase::AcquiringMedia);
        let tracks = match self.acquire_media().await {
            Some(tracks) => tracks,
            None => {
                self.set_phase(CallPhase::MediaFailed);
                self.set_phase(CallPhase::Closed);
                return;
            }
        };
        self.set_phase(CallPhase::MediaReady);

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 && !self.backoff(attempt, tracks.as_ref()).await {
                self.set_phase(CallPhase::Closed);
                return;
            }
            self.set_phase(CallPhase::Connecting);

            match self.run_attempt(tracks.as_ref()).await {
                Attempt::HangupLocal => {
                    self.outbox.send_hangup(&self.remote_id).await;
                    self.set_phase(CallPhase::Closed);
                    return;
                }
                Attempt::Finished => {
                    self.set_phase(CallPhase::Closed);
                    return;
                }
                Attempt::TransportLost => {
                    self.set_phase(CallPhase::ConnectionFailed);
                    if attempt >= self.retry.max_retries {
                        warn!(
                            local = %self.local_id,
                            remote = %self.remote_id,
                            attempts = attempt + 1,
                            "connection retries exhausted"
                        );
                        self.set_phase(CallPhase::Closed);
                        return;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Publish a phase. Re-entering the current phase or moving past a
    /// terminal phase is a no-op, so observers see each transition once.
    fn set_phase(&self, next: CallPhase) {
        self.phase.send_if_modified(|current| {
            if *current == next || current.is_terminal() {
                return false;
            }
            debug!(remote = %self.remote_id, from = ?current, to = ?next, "call phase");
            *current = next;
            true
        });
    }

    /// Acquire local tracks, degrading to audio-only before giving up
    async fn acquire_media(&self) -> Option<Box<dyn MediaTracks>> {
        match self.media.acquire(MediaConstraints::audio_and_video()).await {
            Ok(tracks) => Some(tracks),
            Err(err) => {
                info!(remote = %self.remote_id, error = %err, "camera unavailable, trying audio only");
                match self.media.acquire(MediaConstraints::audio_only()).await {
                    Ok(tracks) => Some(tracks),
                    Err(err) => {
                        warn!(remote = %self.remote_id, error = %err, "media acquisition failed");
                        None
                    }
                }
            }
        }
    }

    /// Wait out the retry backoff, still answering commands.
    ///
    /// Returns false when the call was ended during the wait. Signals that
    /// arrive here belong to the dead transport and are dropped; the next
    /// attempt renegotiates from scratch.
    async fn backoff(&mut self, attempt: u32, tracks: &dyn MediaTracks) -> bool {
        let delay = self.retry.delay_for(attempt);
        debug!(remote = %self.remote_id, attempt, ?delay, "waiting before reconnect");
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Hangup) => {
                        self.outbox.send_hangup(&self.remote_id).await;
                        return false;
                    }
                    Some(Command::RemoteClosed) | None => return false,
                    Some(Command::SetMuted(muted)) => tracks.set_audio_enabled(!muted),
                    Some(Command::SetCameraEnabled(on)) => tracks.set_video_enabled(on),
                    Some(Command::Signal(_)) => {
                        debug!(remote = %self.remote_id, "signal dropped during reconnect backoff");
                    }
                },
            }
        }
    }

    /// Run one peer connection to completion
    async fn run_attempt(&mut self, tracks: &dyn MediaTracks) -> Attempt {
        let mut peer = match self.connector.connect(self.role, tracks).await {
            Ok(peer) => peer,
            Err(err) => {
                debug!(remote = %self.remote_id, error = %err, "peer setup failed");
                return Attempt::TransportLost;
            }
        };

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Signal(signal)) => {
                        if let Err(err) = peer.apply_signal(signal).await {
                            debug!(remote = %self.remote_id, error = %err, "signal rejected by transport");
                        }
                    }
                    Some(Command::SetMuted(muted)) => tracks.set_audio_enabled(!muted),
                    Some(Command::SetCameraEnabled(on)) => tracks.set_video_enabled(on),
                    Some(Command::Hangup) => {
                        peer.close().await;
                        return Attempt::HangupLocal;
                    }
                    Some(Command::RemoteClosed) | None => {
                        peer.close().await;
                        return Attempt::Finished;
                    }
                },
                event = peer.next_event() => match event {
                    Some(PeerEvent::Signal(signal)) => {
                        self.outbox.send_signal(&self.remote_id, signal).await;
                    }
                    Some(PeerEvent::RemoteStream) | Some(PeerEvent::TransportConnected) => {
                        self.set_phase(CallPhase::Connected);
                    }
                    Some(PeerEvent::TransportFailed) | None => {
                        peer.close().await;
                        return Attempt::TransportLost;
                    }
                },
            }
        }
    }
}
