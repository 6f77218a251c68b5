//! Route construction
//!
//! - `api` - REST routes (protected by the auth middleware)
//! - `ws` - WebSocket route (authenticates in-band via `identify`)

pub mod api;
pub mod ws;

pub use api::create_api_router;
pub use ws::create_ws_router;
