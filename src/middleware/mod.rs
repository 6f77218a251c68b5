//! Request middleware
//!
//! - `auth` - Bearer token validation for the REST surface

pub mod auth;

pub use auth::auth_middleware;
