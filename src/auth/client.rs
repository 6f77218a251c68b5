//! HTTP client for the external authentication service

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::ServerConfig;
use crate::errors::auth_error::{AuthError, AuthResult};

use super::context::Identity;

/// Maximum error body length kept from auth service responses
const MAX_ERROR_BODY_LEN: usize = 500;

/// Client for the platform's token verification endpoint
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    verify_url: String,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("verify_url", &self.verify_url)
            .finish()
    }
}

impl AuthClient {
    /// Create an AuthClient from server configuration
    pub fn from_config(config: &ServerConfig) -> AuthResult<Self> {
        let base_url = config.auth_service_url.as_ref().ok_or_else(|| {
            AuthError::ConfigError("AUTH_SERVICE_URL is not configured".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.auth_timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AuthError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            verify_url: format!("{}/verify", base_url.trim_end_matches('/')),
        })
    }

    /// Resolve a bearer token to an identity via the auth service
    ///
    /// The service replies `200` with `{"userId": "...", "role": "..."}` for
    /// a valid token and `401` otherwise.
    pub async fn verify_token(&self, token: &str) -> AuthResult<Identity> {
        let response = self
            .client
            .get(&self.verify_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let identity = response.json::<Identity>().await?;
                debug!(user = %identity.user_id, "token verified");
                Ok(identity)
            }
            _ => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error body".to_string());

                let capped_body = if error_body.len() > MAX_ERROR_BODY_LEN {
                    // Back off to a char boundary; slicing mid-character panics.
                    let mut end = MAX_ERROR_BODY_LEN;
                    while !error_body.is_char_boundary(end) {
                        end -= 1;
                    }
                    format!("{}... (truncated)", &error_body[..end])
                } else {
                    error_body
                };

                if status == StatusCode::UNAUTHORIZED {
                    Err(AuthError::Unauthorized(capped_body))
                } else {
                    Err(AuthError::AuthServiceError(status, capped_body))
                }
            }
        }
    }
}
