//! Queue operation error types
//!
//! Every coordinator operation returns a typed error when its precondition
//! fails. Failed operations never broadcast: no state changed, so no event
//! is due.

use thiserror::Error;

/// Errors produced by queue coordinator operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// `startQueue` for a pair that already has an active queue
    #[error("Queue is already active for this doctor and hospital")]
    AlreadyActive,

    /// `joinQueue` while the doctor is not accepting joins
    #[error("Queue is not currently accepting patients")]
    QueueNotActive,

    /// `joinQueue` for a patient already waiting or in consultation
    #[error("Patient is already in this queue")]
    AlreadyQueued,

    /// `callNext` with nobody waiting
    #[error("No patients are waiting in the queue")]
    QueueEmpty,

    /// `callNext` while a consultation is still in progress
    #[error("A consultation is already in progress")]
    ConsultationInProgress,

    /// `completeConsultation` for a patient who is not the current one
    #[error("Patient is not in consultation")]
    NotInConsultation,

    /// Operation on a (doctor, hospital) pair with no queue
    #[error("No queue exists for this doctor and hospital")]
    NotFound,
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
