//! Server configuration
//!
//! Configuration comes from environment variables (with `.env` support via
//! dotenvy). The module is split into submodules:
//!
//! - `env`: environment variable loading
//! - `validation`: configuration validation logic
//! - `utils`: parsing helpers
//!
//! # Example
//! ```rust,no_run
//! use telequeue::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

mod env;
mod utils;
mod validation;

/// Server configuration
///
/// Contains everything needed to run the coordination server:
/// - Server settings (host, port)
/// - Authentication settings (remote auth service or local JWT secret)
/// - Durable queue record store settings
/// - Wait-time estimation settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Authentication configuration
    pub auth_service_url: Option<String>,
    pub auth_jwt_secret: Option<String>,
    pub auth_timeout_seconds: u64,
    pub auth_required: bool,

    // Durable queue record store (optional projection of live state)
    pub record_store_url: Option<String>,
    pub record_timeout_seconds: u64,

    // Wait-time estimate: minutes per queue position
    pub wait_minutes_per_position: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            auth_service_url: None,
            auth_jwt_secret: None,
            auth_timeout_seconds: 5,
            auth_required: false,
            record_store_url: None,
            record_timeout_seconds: 10,
            wait_minutes_per_position: 15,
        }
    }
}

impl ServerConfig {
    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if the remote auth service is configured
    pub fn has_remote_auth(&self) -> bool {
        self.auth_service_url.is_some()
    }

    /// Check if local JWT validation is configured
    pub fn has_jwt_secret(&self) -> bool {
        self.auth_jwt_secret.is_some()
    }
}
