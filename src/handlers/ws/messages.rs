//! WebSocket message types
//!
//! All client/server events ride a single tagged JSON envelope. Event names
//! and field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::queue::PatientTicket;

/// Events sent by clients
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// First message on a connection: resolve the bearer token to an identity
    #[serde(rename = "identify")]
    Identify { token: String },

    /// Subscribe this connection to the user's direct channel
    #[serde(rename = "joinRoom", rename_all = "camelCase")]
    JoinRoom { user_id: String },

    #[serde(rename = "startQueue", rename_all = "camelCase")]
    StartQueue {
        doctor_id: String,
        hospital_id: String,
    },

    #[serde(rename = "joinQueue", rename_all = "camelCase")]
    JoinQueue {
        doctor_id: String,
        hospital_id: String,
        patient_id: String,
    },

    #[serde(rename = "leaveQueue", rename_all = "camelCase")]
    LeaveQueue {
        doctor_id: String,
        hospital_id: String,
        patient_id: String,
    },

    #[serde(rename = "callNextPatient", rename_all = "camelCase")]
    CallNextPatient {
        doctor_id: String,
        hospital_id: String,
    },

    #[serde(rename = "completeConsultation", rename_all = "camelCase")]
    CompleteConsultation {
        doctor_id: String,
        hospital_id: String,
        patient_id: String,
    },

    /// Maps to start/end queue by `is_active`
    #[serde(rename = "toggleQueueStatus", rename_all = "camelCase")]
    ToggleQueueStatus {
        doctor_id: String,
        hospital_id: String,
        is_active: bool,
    },

    /// Opaque signaling payload relayed to `to`
    #[serde(rename = "videoCallSignal")]
    VideoCallSignal {
        signal: Value,
        from: String,
        to: String,
    },

    #[serde(rename = "requestVideoCall")]
    RequestVideoCall { from: String, to: String },

    #[serde(rename = "videoCallResponse")]
    VideoCallResponse {
        from: String,
        to: String,
        accepted: bool,
    },

    #[serde(rename = "endVideoCall")]
    EndVideoCall { from: String, to: String },
}

/// Events sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Identity resolution succeeded
    #[serde(rename = "identified", rename_all = "camelCase")]
    Identified { user_id: String, role: String },

    /// Queue-wide view after any successful transition
    #[serde(rename = "queueUpdate", rename_all = "camelCase")]
    QueueUpdate {
        doctor_id: String,
        hospital_id: String,
        queue: Vec<PatientTicket>,
        current: Option<PatientTicket>,
        is_active: bool,
    },

    /// Per-patient projection, recomputed at broadcast time
    #[serde(rename = "positionUpdate", rename_all = "camelCase")]
    PositionUpdate {
        doctor_id: String,
        hospital_id: String,
        position: u32,
        estimated_wait_minutes: u32,
    },

    /// Direct notification to the patient whose turn came up
    #[serde(rename = "patientCalled", rename_all = "camelCase")]
    PatientCalled {
        doctor_id: String,
        hospital_id: String,
        patient_id: String,
    },

    #[serde(rename = "consultationComplete", rename_all = "camelCase")]
    ConsultationComplete {
        doctor_id: String,
        hospital_id: String,
        patient_id: String,
    },

    /// Queue opened or closed for joins
    #[serde(rename = "onlineModeToggle", rename_all = "camelCase")]
    OnlineModeToggle {
        doctor_id: String,
        hospital_id: String,
        is_active: bool,
    },

    #[serde(rename = "videoCallSignal")]
    VideoCallSignal {
        signal: Value,
        from: String,
        to: String,
    },

    #[serde(rename = "videoCallRequest")]
    VideoCallRequest { from: String, to: String },

    #[serde(rename = "videoCallResponse")]
    VideoCallResponse {
        from: String,
        to: String,
        accepted: bool,
    },

    #[serde(rename = "videoCallEnded")]
    VideoCallEnded { from: String, to: String },

    #[serde(rename = "error")]
    Error { message: String },
}
