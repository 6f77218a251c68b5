//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and read-only queue snapshots
//! - `ws` - WebSocket queue coordination and call signaling

pub mod api;
pub mod ws;

// Re-export commonly used handlers for convenient access
pub use ws::ws_handler;
