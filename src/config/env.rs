use std::env;

use super::utils::parse_bool;
use super::validation::validate_auth_required;
use super::ServerConfig;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if:
    /// - PORT or another numeric variable is malformed
    /// - AUTH_REQUIRED=true but no auth backend is configured
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;

        // Authentication configuration
        let auth_service_url = env::var("AUTH_SERVICE_URL").ok();
        let auth_jwt_secret = env::var("AUTH_JWT_SECRET").ok();
        let auth_timeout_seconds = env::var("AUTH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);
        let auth_required = env::var("AUTH_REQUIRED")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);

        // Durable record store configuration
        let record_store_url = env::var("RECORD_STORE_URL").ok();
        let record_timeout_seconds = env::var("RECORD_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        // Wait-time estimation
        let wait_minutes_per_position = env::var("WAIT_MINUTES_PER_POSITION")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(15);

        // Validate that when auth is required, at least one auth method is configured
        validate_auth_required(auth_required, &auth_service_url, &auth_jwt_secret)?;

        Ok(ServerConfig {
            host,
            port,
            auth_service_url,
            auth_jwt_secret,
            auth_timeout_seconds,
            auth_required,
            record_store_url,
            record_timeout_seconds,
            wait_minutes_per_position,
        })
    }
}
