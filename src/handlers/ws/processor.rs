//! Client event dispatch
//!
//! Routes each parsed client event to the queue coordinator, signaling
//! relay or room registry. Role checks happen here: queue control is
//! doctor-only, patients act only for themselves, and signaling must carry
//! the sender's own identity. All checks are skipped when the server runs
//! with authentication disabled.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::auth::{Identity, Role};
use crate::queue::QueueKey;
use crate::rooms::Channel;
use crate::signaling::SignalEnvelope;
use crate::state::AppState;

use super::error::{WsError, WsResult};
use super::messages::{ClientEvent, ServerEvent};
use super::state::ConnectionState;

/// Handle one client event, sending any direct reply through the
/// connection's outbound queue
pub async fn handle_client_event(
    event: ClientEvent,
    state: &mut ConnectionState,
    event_tx: &mpsc::Sender<ServerEvent>,
    app: &Arc<AppState>,
) {
    match dispatch(event, state, app).await {
        Ok(Some(reply)) => {
            let _ = event_tx.send(reply).await;
        }
        Ok(None) => {}
        Err(err) => {
            debug!(conn = %state.conn_id, error = %err, "client event rejected");
            let _ = event_tx.send(err.to_event()).await;
        }
    }
}

async fn dispatch(
    event: ClientEvent,
    state: &mut ConnectionState,
    app: &Arc<AppState>,
) -> WsResult<Option<ServerEvent>> {
    match event {
        ClientEvent::Identify { token } => {
            let identity = app.auth.resolve(&token).await?;
            app.rooms
                .join(state.conn_id, Channel::user(&identity.user_id));
            let reply = ServerEvent::Identified {
                user_id: identity.user_id.clone(),
                role: identity.role.to_string(),
            };
            state.identity = Some(identity);
            Ok(Some(reply))
        }

        ClientEvent::JoinRoom { user_id } => {
            require_self(state, app, &user_id)?;
            app.rooms.join(state.conn_id, Channel::user(&user_id));
            Ok(None)
        }

        ClientEvent::StartQueue {
            doctor_id,
            hospital_id,
        } => {
            require_doctor(state, app)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            app.rooms.join(state.conn_id, Channel::queue(&key));
            app.queues.start_queue(&key).await?;
            Ok(None)
        }

        ClientEvent::JoinQueue {
            doctor_id,
            hospital_id,
            patient_id,
        } => {
            require_self(state, app, &patient_id)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            // Subscribe before mutating so this connection sees its own
            // queueUpdate and positionUpdate.
            app.rooms.join(state.conn_id, Channel::queue(&key));
            app.rooms.join(state.conn_id, Channel::user(&patient_id));
            app.queues.join_queue(&key, &patient_id).await?;
            Ok(None)
        }

        ClientEvent::LeaveQueue {
            doctor_id,
            hospital_id,
            patient_id,
        } => {
            require_self(state, app, &patient_id)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            app.queues.leave_queue(&key, &patient_id).await?;
            Ok(None)
        }

        ClientEvent::CallNextPatient {
            doctor_id,
            hospital_id,
        } => {
            require_doctor(state, app)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            app.rooms.join(state.conn_id, Channel::queue(&key));
            app.queues.call_next(&key).await?;
            Ok(None)
        }

        ClientEvent::CompleteConsultation {
            doctor_id,
            hospital_id,
            patient_id,
        } => {
            require_doctor_or_self(state, app, &patient_id)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            app.queues.complete_consultation(&key, &patient_id).await?;
            Ok(None)
        }

        ClientEvent::ToggleQueueStatus {
            doctor_id,
            hospital_id,
            is_active,
        } => {
            require_doctor(state, app)?;
            let key = QueueKey::new(doctor_id, hospital_id);
            app.rooms.join(state.conn_id, Channel::queue(&key));
            if is_active {
                app.queues.start_queue(&key).await?;
            } else {
                app.queues.end_queue(&key).await?;
            }
            Ok(None)
        }

        ClientEvent::VideoCallSignal { signal, from, to } => {
            require_sender(state, app, &from)?;
            app.relay.relay(SignalEnvelope { from, to, signal });
            Ok(None)
        }

        ClientEvent::RequestVideoCall { from, to } => {
            require_sender(state, app, &from)?;
            app.relay.request_call(&from, &to);
            Ok(None)
        }

        ClientEvent::VideoCallResponse { from, to, accepted } => {
            require_sender(state, app, &from)?;
            app.relay.respond_call(&from, &to, accepted);
            Ok(None)
        }

        ClientEvent::EndVideoCall { from, to } => {
            require_sender(state, app, &from)?;
            app.relay.end_call(&from, &to);
            Ok(None)
        }
    }
}

fn identity<'a>(state: &'a ConnectionState, app: &Arc<AppState>) -> WsResult<Option<&'a Identity>> {
    if !app.config.auth_required {
        return Ok(state.identity());
    }
    match state.identity() {
        Some(identity) => Ok(Some(identity)),
        None => Err(WsError::Unauthenticated),
    }
}

/// Queue control is doctor-only
fn require_doctor(state: &ConnectionState, app: &Arc<AppState>) -> WsResult<()> {
    match identity(state, app)? {
        Some(id) if id.role != Role::Doctor => {
            warn!(user = %id.user_id, "doctor-only operation rejected");
            Err(WsError::DoctorOnly)
        }
        _ => Ok(()),
    }
}

/// Patients may only act for themselves
fn require_self(state: &ConnectionState, app: &Arc<AppState>, user_id: &str) -> WsResult<()> {
    match identity(state, app)? {
        Some(id) if id.role == Role::Patient && id.user_id != user_id => {
            Err(WsError::IdentityMismatch)
        }
        _ => Ok(()),
    }
}

/// A consultation is completed by the doctor or by the patient themself
fn require_doctor_or_self(
    state: &ConnectionState,
    app: &Arc<AppState>,
    patient_id: &str,
) -> WsResult<()> {
    match identity(state, app)? {
        Some(id) if id.role == Role::Patient && id.user_id != patient_id => {
            Err(WsError::IdentityMismatch)
        }
        _ => Ok(()),
    }
}

/// Signaling must carry the sender's own identity in `from`
fn require_sender(state: &ConnectionState, app: &Arc<AppState>, from: &str) -> WsResult<()> {
    match identity(state, app)? {
        Some(id) if id.user_id != from => Err(WsError::IdentityMismatch),
        _ => Ok(()),
    }
}
