//! WebSocket error types
//!
//! Errors raised while processing a client event. Each one is reported to
//! the issuing connection as an `error` event and never broadcast.

use thiserror::Error;

use crate::errors::AuthError;
use crate::queue::QueueError;

use super::messages::ServerEvent;

/// Errors surfaced to a WebSocket client
#[derive(Debug, Error)]
pub enum WsError {
    /// Connection sent an operation before a successful `identify`
    #[error("Not identified. Send an identify message first.")]
    Unauthenticated,

    /// Identified role is not allowed to perform this operation
    #[error("Operation requires a doctor identity")]
    DoctorOnly,

    /// Patient tried to act on behalf of a different patient
    #[error("Operation is only allowed for your own identity")]
    IdentityMismatch,

    /// Queue precondition failed
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Identity resolution failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl WsError {
    /// Convert to the wire representation
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::Error {
            message: self.to_string(),
        }
    }
}

/// Result type for WebSocket event processing
pub type WsResult<T> = Result<T, WsError>;
