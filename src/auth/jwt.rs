//! Local JWT validation
//!
//! Offline path for identity resolution: tokens are HS256-signed by the
//! platform's account service with the shared secret. Used when no remote
//! auth service is configured, and as the verification primitive in tests.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::auth_error::{AuthError, AuthResult};

use super::context::{Identity, Role};

/// Claims carried by a platform access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// User role, `doctor` or `patient`
    pub role: Role,
    /// Expiration time as a unix timestamp
    pub exp: i64,
}

/// Validate a token and extract the identity it asserts
pub fn decode_identity(token: &str, secret: &str) -> AuthResult<Identity> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {e}")))?;

    Ok(Identity {
        user_id: data.claims.sub,
        role: data.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[test]
    fn valid_token_resolves_identity() {
        let token = sign(
            &Claims {
                sub: "doc-42".into(),
                role: Role::Doctor,
                exp: now() + 300,
            },
            "secret",
        );

        let identity = decode_identity(&token, "secret").unwrap();
        assert_eq!(identity.user_id, "doc-42");
        assert_eq!(identity.role, Role::Doctor);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(
            &Claims {
                sub: "u1".into(),
                role: Role::Patient,
                exp: now() + 300,
            },
            "secret",
        );

        let err = decode_identity(&token, "other").unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign(
            &Claims {
                sub: "u1".into(),
                role: Role::Patient,
                exp: now() - 300,
            },
            "secret",
        );

        assert!(decode_identity(&token, "secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_identity("not-a-jwt", "secret").is_err());
    }
}
