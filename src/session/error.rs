//! Call session error types

use thiserror::Error;

/// Failures inside the call session state machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Media layer refused to provide local tracks, even audio-only
    #[error("Media access was denied")]
    MediaAccessDenied,

    /// Peer transport could not be established or was lost
    #[error("Peer connection failed")]
    ConnectivityFailure,
}
