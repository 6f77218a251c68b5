use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error codes for structured error responses
pub mod error_codes {
    pub const MISSING_AUTH_HEADER: &str = "missing_auth_header";
    pub const INVALID_AUTH_HEADER: &str = "invalid_auth_header";
    pub const AUTH_SERVICE_UNAVAILABLE: &str = "auth_service_unavailable";
    pub const AUTH_SERVICE_ERROR: &str = "auth_service_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const CONFIG_ERROR: &str = "config_error";
}

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header is missing from request
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// Authorization header format is invalid (not "Bearer {token}")
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// Auth service returned an error response
    #[error("Auth service error ({0}): {1}")]
    AuthServiceError(StatusCode, String),

    /// Token validation failed (unauthorized)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error (missing required auth config)
    #[error("Auth configuration error: {0}")]
    ConfigError(String),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AuthError {
    /// Get the error code for structured error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => error_codes::MISSING_AUTH_HEADER,
            AuthError::InvalidAuthHeader => error_codes::INVALID_AUTH_HEADER,
            AuthError::AuthServiceError(_, _) => error_codes::AUTH_SERVICE_ERROR,
            AuthError::Unauthorized(_) => error_codes::UNAUTHORIZED,
            AuthError::ConfigError(_) => error_codes::CONFIG_ERROR,
            AuthError::HttpError(_) => error_codes::AUTH_SERVICE_UNAVAILABLE,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::HttpError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::AuthServiceError(status, _) => {
                // 4xx from the auth service means the token was bad; 5xx
                // means the service itself failed.
                if status.is_client_error() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            AuthError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error at the appropriate level
    pub fn log(&self) {
        match self {
            // Debug level for expected auth failures (missing/invalid headers)
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                tracing::debug!("{}", self);
            }
            AuthError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
            }
            AuthError::AuthServiceError(code, msg) => {
                tracing::warn!("Auth service error ({}): {}", code, msg);
            }
            AuthError::ConfigError(msg) => {
                tracing::error!("Auth configuration error: {}", msg);
            }
            AuthError::HttpError(err) => {
                tracing::error!("Auth HTTP error: {}", err);
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_code = self.error_code();
        let error_message = self.to_string();

        // Response format: {"error": "error_code", "message": "human readable message"}
        let body = Json(json!({
            "error": error_code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}

// Result type alias for convenience
pub type AuthResult<T> = Result<T, AuthError>;
