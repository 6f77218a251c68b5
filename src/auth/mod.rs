//! Bearer-credential resolution
//!
//! Two resolution paths exist: the remote auth service (preferred when
//! `AUTH_SERVICE_URL` is set) and local HS256 validation against
//! `AUTH_JWT_SECRET`. The same [`Authenticator`] serves both the REST
//! middleware and the WebSocket `identify` flow.

pub mod client;
pub mod context;
pub mod jwt;

pub use client::AuthClient;
pub use context::{Identity, Role};
pub use jwt::{decode_identity, Claims};

use crate::config::ServerConfig;
use crate::errors::auth_error::{AuthError, AuthResult};

/// Resolves bearer tokens to identities
pub struct Authenticator {
    client: Option<AuthClient>,
    jwt_secret: Option<String>,
}

impl Authenticator {
    /// Authenticator with no backend; every resolution fails
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            jwt_secret: None,
        }
    }

    /// Build from server configuration. Neither path being configured is
    /// fine as long as `AUTH_REQUIRED` stays false.
    pub fn from_config(config: &ServerConfig) -> AuthResult<Self> {
        let client = match &config.auth_service_url {
            Some(_) => Some(AuthClient::from_config(config)?),
            None => None,
        };
        Ok(Self {
            client,
            jwt_secret: config.auth_jwt_secret.clone(),
        })
    }

    /// Resolve a bearer token, remote service first, local JWT otherwise
    pub async fn resolve(&self, token: &str) -> AuthResult<Identity> {
        if let Some(client) = &self.client {
            return client.verify_token(token).await;
        }
        if let Some(secret) = &self.jwt_secret {
            return decode_identity(token, secret);
        }
        Err(AuthError::ConfigError(
            "no authentication backend configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_authenticator_rejects_everything() {
        let auth = Authenticator::from_config(&ServerConfig::default()).unwrap();
        let err = auth.resolve("token").await.unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    #[tokio::test]
    async fn jwt_secret_enables_local_resolution() {
        use jsonwebtoken::{encode, EncodingKey, Header};
        use std::time::{SystemTime, UNIX_EPOCH};

        let config = ServerConfig {
            auth_jwt_secret: Some("secret".into()),
            ..ServerConfig::default()
        };
        let auth = Authenticator::from_config(&config).unwrap();

        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            + 300;
        let token = encode(
            &Header::default(),
            &Claims {
                sub: "p1".into(),
                role: Role::Patient,
                exp,
            },
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let identity = auth.resolve(&token).await.unwrap();
        assert_eq!(identity.user_id, "p1");
        assert_eq!(identity.role, Role::Patient);
    }
}
