//! Queue coordinator
//!
//! Single mutation entrypoint for every queue. Each operation locks the one
//! queue it touches, applies the transition, and broadcasts the resulting
//! view while still holding the lock, so observers see broadcasts in the
//! same order the transitions happened. Operations on distinct (doctor,
//! hospital) pairs never contend.
//!
//! Failed operations return the typed error to the caller and broadcast
//! nothing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::handlers::ws::messages::ServerEvent;
use crate::records::RecordStore;
use crate::rooms::{Channel, RoomRegistry};

use super::error::{QueueError, QueueResult};
use super::{now_millis, PatientTicket, QueueKey, QueueSnapshot, QueueState};

/// Coordinates all queue mutations and their broadcasts
pub struct QueueCoordinator {
    rooms: Arc<RoomRegistry>,
    records: Option<Arc<RecordStore>>,
    queues: RwLock<HashMap<QueueKey, Arc<Mutex<QueueState>>>>,
    /// Minutes of estimated wait per position ahead in the line
    wait_minutes_per_position: u32,
}

impl QueueCoordinator {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        records: Option<Arc<RecordStore>>,
        wait_minutes_per_position: u32,
    ) -> Self {
        Self {
            rooms,
            records,
            queues: RwLock::new(HashMap::new()),
            wait_minutes_per_position,
        }
    }

    /// Handle for one queue, created on demand
    fn entry(&self, key: &QueueKey) -> Arc<Mutex<QueueState>> {
        if let Some(existing) = self.queues.read().get(key) {
            return existing.clone();
        }
        let mut queues = self.queues.write();
        queues
            .entry(key.clone())
            .or_insert_with(|| {
                let mut state = QueueState::new();
                // Created implicitly by a non-start operation: not yet open
                state.set_active(false);
                Arc::new(Mutex::new(state))
            })
            .clone()
    }

    /// Handle for an existing queue only
    fn existing(&self, key: &QueueKey) -> QueueResult<Arc<Mutex<QueueState>>> {
        self.queues
            .read()
            .get(key)
            .cloned()
            .ok_or(QueueError::NotFound)
    }

    /// Open the queue for joins
    ///
    /// Reuses a leftover inactive queue for the same pair so queue numbers
    /// stay unique across a close/reopen cycle within one process lifetime.
    pub async fn start_queue(&self, key: &QueueKey) -> QueueResult<()> {
        let entry = self.entry(key);
        let mut state = entry.lock().await;
        if state.is_active() {
            return Err(QueueError::AlreadyActive);
        }
        state.set_active(true);
        info!(queue = %key, "queue opened");

        self.rooms.broadcast(
            &Channel::queue(key),
            &ServerEvent::OnlineModeToggle {
                doctor_id: key.doctor_id.clone(),
                hospital_id: key.hospital_id.clone(),
                is_active: true,
            },
        );
        self.publish(key, &state.snapshot());
        Ok(())
    }

    /// Append a patient to the waiting line
    pub async fn join_queue(&self, key: &QueueKey, patient_id: &str) -> QueueResult<PatientTicket> {
        let entry = self.existing(key)?;
        let mut state = entry.lock().await;
        let ticket = state.join(patient_id, now_millis())?;
        info!(queue = %key, patient = %patient_id, number = ticket.queue_number, "patient joined");
        self.publish(key, &state.snapshot());
        Ok(ticket)
    }

    /// Move the head of the line into consultation and notify that patient
    pub async fn call_next(&self, key: &QueueKey) -> QueueResult<PatientTicket> {
        let entry = self.existing(key)?;
        let mut state = entry.lock().await;
        let ticket = state.call_next()?;
        info!(queue = %key, patient = %ticket.patient_id, "patient called");

        self.rooms.send_to_user(
            &ticket.patient_id,
            &ServerEvent::PatientCalled {
                doctor_id: key.doctor_id.clone(),
                hospital_id: key.hospital_id.clone(),
                patient_id: ticket.patient_id.clone(),
            },
        );
        self.publish(key, &state.snapshot());
        Ok(ticket)
    }

    /// Finish the current consultation for the named patient
    pub async fn complete_consultation(
        &self,
        key: &QueueKey,
        patient_id: &str,
    ) -> QueueResult<PatientTicket> {
        let entry = self.existing(key)?;
        let mut state = entry.lock().await;
        let ticket = state.complete(patient_id)?;
        info!(queue = %key, patient = %patient_id, "consultation complete");

        self.rooms.broadcast(
            &Channel::queue(key),
            &ServerEvent::ConsultationComplete {
                doctor_id: key.doctor_id.clone(),
                hospital_id: key.hospital_id.clone(),
                patient_id: patient_id.to_string(),
            },
        );
        self.publish(key, &state.snapshot());
        Ok(ticket)
    }

    /// Withdraw a waiting patient. Absent patients are a no-op with no
    /// broadcast.
    pub async fn leave_queue(&self, key: &QueueKey, patient_id: &str) -> QueueResult<()> {
        let entry = self.existing(key)?;
        let mut state = entry.lock().await;
        if state.leave(patient_id).is_some() {
            info!(queue = %key, patient = %patient_id, "patient left");
            self.publish(key, &state.snapshot());
        } else {
            debug!(queue = %key, patient = %patient_id, "leave for absent patient ignored");
        }
        Ok(())
    }

    /// Stop accepting joins. Waiting patients and any consultation in
    /// progress are untouched; the queue is evicted once it fully drains.
    pub async fn end_queue(&self, key: &QueueKey) -> QueueResult<()> {
        let entry = self.existing(key)?;
        let mut state = entry.lock().await;
        if !state.is_active() {
            // Already closed; nothing changed, so nothing to broadcast.
            debug!(queue = %key, "end for inactive queue ignored");
            return Ok(());
        }
        state.set_active(false);
        info!(queue = %key, "queue closed");

        self.rooms.broadcast(
            &Channel::queue(key),
            &ServerEvent::OnlineModeToggle {
                doctor_id: key.doctor_id.clone(),
                hospital_id: key.hospital_id.clone(),
                is_active: false,
            },
        );
        self.publish(key, &state.snapshot());

        if state.is_evictable() {
            drop(state);
            self.queues.write().remove(key);
        }
        Ok(())
    }

    /// Live view of one queue, for the REST surface
    pub async fn snapshot(&self, key: &QueueKey) -> QueueResult<QueueSnapshot> {
        let entry = self.existing(key)?;
        let state = entry.lock().await;
        Ok(state.snapshot())
    }

    /// Broadcast the queue-wide view plus per-patient position projections,
    /// then hand the snapshot to the durable record store.
    ///
    /// Positions are recomputed from the ticket's index here, never cached,
    /// so they stay correct after leaves.
    fn publish(&self, key: &QueueKey, snapshot: &QueueSnapshot) {
        self.rooms.broadcast(
            &Channel::queue(key),
            &ServerEvent::QueueUpdate {
                doctor_id: key.doctor_id.clone(),
                hospital_id: key.hospital_id.clone(),
                queue: snapshot.waiting.clone(),
                current: snapshot.current.clone(),
                is_active: snapshot.is_active,
            },
        );

        for (idx, ticket) in snapshot.waiting.iter().enumerate() {
            let position = (idx + 1) as u32;
            self.rooms.send_to_user(
                &ticket.patient_id,
                &ServerEvent::PositionUpdate {
                    doctor_id: key.doctor_id.clone(),
                    hospital_id: key.hospital_id.clone(),
                    position,
                    estimated_wait_minutes: position * self.wait_minutes_per_position,
                },
            );
        }

        if let Some(records) = &self.records {
            records.clone().publish(key.clone(), snapshot.clone());
        }
    }
}
