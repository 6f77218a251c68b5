//! Per-connection state
//!
//! Owned by the socket task and mutated only there, so no locking is
//! involved. The connection id ties the socket to its room registry
//! entries; the identity is set once by a successful `identify`.

use crate::auth::Identity;
use crate::rooms::ConnId;

/// State carried by one WebSocket connection
pub struct ConnectionState {
    pub conn_id: ConnId,
    /// Resolved identity, present after `identify`
    pub identity: Option<Identity>,
}

impl ConnectionState {
    pub fn new(conn_id: ConnId) -> Self {
        Self {
            conn_id,
            identity: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
