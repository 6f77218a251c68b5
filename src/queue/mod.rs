//! In-memory consultation queue state
//!
//! One [`QueueState`] exists per (doctor, hospital) pair and holds the
//! ordered waiting line plus the patient currently in consultation. This
//! in-process state is the source of truth for live coordination; the
//! durable record store (see [`crate::records`]) is an asynchronous,
//! best-effort projection of it.
//!
//! Invariants enforced here:
//! - a patient id appears in at most one of {waiting, current}
//! - `current` is only set by a call-next transition and only cleared by a
//!   complete transition
//! - queue numbers are strictly increasing and never reused within the life
//!   of one `QueueState`, so "number 7" always refers to the same join event

pub mod coordinator;
pub mod error;

pub use coordinator::QueueCoordinator;
pub use error::{QueueError, QueueResult};

use std::collections::VecDeque;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Identifies one doctor's waiting line at one facility
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueKey {
    pub doctor_id: String,
    pub hospital_id: String,
}

impl QueueKey {
    pub fn new(doctor_id: impl Into<String>, hospital_id: impl Into<String>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            hospital_id: hospital_id.into(),
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doctor_id, self.hospital_id)
    }
}

/// One patient's entry in a queue
///
/// `queue_number` identifies the join event, not the position: it is never
/// renumbered when earlier patients leave. Position is a presentation
/// projection computed at broadcast time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientTicket {
    pub patient_id: String,
    pub queue_number: u64,
    /// Unix timestamp in milliseconds
    pub joined_at: u64,
}

/// Point-in-time view of a queue, used for broadcasts, the REST surface and
/// the durable record write-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub is_active: bool,
    pub waiting: Vec<PatientTicket>,
    pub current: Option<PatientTicket>,
}

/// Authoritative live state for one (doctor, hospital) queue
#[derive(Debug)]
pub struct QueueState {
    active: bool,
    waiting: VecDeque<PatientTicket>,
    current: Option<PatientTicket>,
    next_number: u64,
}

impl QueueState {
    /// Create a fresh queue, accepting joins immediately
    pub fn new() -> Self {
        Self {
            active: true,
            waiting: VecDeque::new(),
            current: None,
            next_number: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// True if the given patient is waiting or in consultation
    pub fn contains(&self, patient_id: &str) -> bool {
        self.waiting.iter().any(|t| t.patient_id == patient_id)
            || self
                .current
                .as_ref()
                .is_some_and(|t| t.patient_id == patient_id)
    }

    /// Append a patient to the end of the waiting line
    pub fn join(&mut self, patient_id: &str, joined_at: u64) -> QueueResult<PatientTicket> {
        if !self.active {
            return Err(QueueError::QueueNotActive);
        }
        if self.contains(patient_id) {
            return Err(QueueError::AlreadyQueued);
        }

        let ticket = PatientTicket {
            patient_id: patient_id.to_string(),
            queue_number: self.next_number,
            joined_at,
        };
        self.next_number += 1;
        self.waiting.push_back(ticket.clone());
        Ok(ticket)
    }

    /// Move the head of the waiting line into consultation
    ///
    /// Strict FIFO: the ticket with the smallest queue number is always the
    /// head, because joins only ever append.
    pub fn call_next(&mut self) -> QueueResult<PatientTicket> {
        if self.current.is_some() {
            return Err(QueueError::ConsultationInProgress);
        }
        let ticket = self.waiting.pop_front().ok_or(QueueError::QueueEmpty)?;
        self.current = Some(ticket.clone());
        Ok(ticket)
    }

    /// Clear the current consultation for the named patient
    pub fn complete(&mut self, patient_id: &str) -> QueueResult<PatientTicket> {
        match &self.current {
            Some(t) if t.patient_id == patient_id => Ok(self.current.take().expect("checked")),
            _ => Err(QueueError::NotInConsultation),
        }
    }

    /// Remove a waiting patient; absent patients are a no-op, not an error
    ///
    /// Remaining tickets keep their queue numbers.
    pub fn leave(&mut self, patient_id: &str) -> Option<PatientTicket> {
        let idx = self
            .waiting
            .iter()
            .position(|t| t.patient_id == patient_id)?;
        self.waiting.remove(idx)
    }

    /// True once the queue can be evicted: nobody waiting, nobody in
    /// consultation, not accepting joins
    pub fn is_evictable(&self) -> bool {
        !self.active && self.waiting.is_empty() && self.current.is_none()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            is_active: self.active,
            waiting: self.waiting.iter().cloned().collect(),
            current: self.current.clone(),
        }
    }
}

impl Default for QueueState {
    fn default() -> Self {
        Self::new()
    }
}

/// Current unix time in milliseconds
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
