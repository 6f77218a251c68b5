//! # WebSocket Coordination Module
//!
//! Real-time interface for queue coordination and peer-call signaling.
//!
//! ## Connection Flow
//! 1. Client connects to the `/ws` endpoint
//! 2. Client sends `{"type": "identify", "token": "..."}` as its first
//!    message; the server resolves the token to an identity and replies with
//!    `{"type": "identified", "userId": "...", "role": "..."}`
//! 3. The connection is automatically subscribed to its user channel; queue
//!    operations subscribe it to the relevant queue channel
//! 4. Queue events (`queueUpdate`, `positionUpdate`, `patientCalled`, ...)
//!    and call signaling events arrive as tagged JSON messages
//!
//! ## Message Types
//!
//! **Client events:**
//! - `{"type": "identify", "token": "..."}`
//! - `{"type": "joinRoom", "userId": "..."}`
//! - `{"type": "startQueue", "doctorId": "...", "hospitalId": "..."}`
//! - `{"type": "joinQueue", "doctorId": "...", "hospitalId": "...", "patientId": "..."}`
//! - `{"type": "leaveQueue", ...}` / `{"type": "callNextPatient", ...}`
//! - `{"type": "completeConsultation", ...}`
//! - `{"type": "toggleQueueStatus", ..., "isActive": true}`
//! - `{"type": "videoCallSignal", "signal": {...}, "from": "...", "to": "..."}`
//! - `{"type": "requestVideoCall", ...}` / `{"type": "videoCallResponse", ...}`
//!   / `{"type": "endVideoCall", ...}`
//!
//! **Server events:**
//! - `{"type": "identified", "userId": "...", "role": "doctor"}`
//! - `{"type": "queueUpdate", "doctorId": "...", "hospitalId": "...", "queue": [...], "current": null, "isActive": true}`
//! - `{"type": "positionUpdate", "position": 2, "estimatedWaitMinutes": 30, ...}`
//! - `{"type": "patientCalled", "patientId": "...", ...}`
//! - `{"type": "consultationComplete", ...}` / `{"type": "onlineModeToggle", ...}`
//! - `{"type": "videoCallSignal", ...}` and the call lifecycle counterparts
//! - `{"type": "error", "message": "..."}`
//!
//! Errors are only ever sent to the connection that caused them; queue
//! state is never broadcast after a failed operation.

pub mod error;
pub mod handler;
pub mod messages;
pub mod processor;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::{WsError, WsResult};
pub use handler::ws_handler;
pub use messages::{ClientEvent, ServerEvent};
pub use state::ConnectionState;
