//! Resolved identity types
//!
//! Inserted into request extensions by the REST auth middleware and stored
//! on WebSocket connections after a successful `identify`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Doctor => f.write_str("doctor"),
            Role::Patient => f.write_str("patient"),
        }
    }
}

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"doctor\"");
        let role: Role = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(role, Role::Patient);
    }

    #[test]
    fn identity_uses_camel_case() {
        let identity: Identity =
            serde_json::from_str(r#"{"userId":"u1","role":"doctor"}"#).unwrap();
        assert_eq!(identity.user_id, "u1");
        assert!(identity.is_doctor());
    }
}
