use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authentication middleware that validates bearer tokens
///
/// The middleware:
/// 1. Extracts the Authorization header and parses the bearer token
/// 2. Resolves the token to an [`Identity`](crate::auth::Identity) via the
///    configured backend (remote auth service or local JWT secret)
/// 3. Inserts the resolved identity into request extensions
/// 4. Returns 401 if resolution fails, or passes the request through
///
/// When `AUTH_REQUIRED=false` the middleware is a pass-through and no
/// identity is attached.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.config.auth_required {
        tracing::debug!("Authentication disabled, skipping validation");
        return Ok(next.run(request).await);
    }

    let request_method = request.method().to_string();
    let request_path = request.uri().path().to_string();

    tracing::debug!(
        method = %request_method,
        path = %request_path,
        "Starting authentication validation"
    );

    // Extract the Authorization header
    let auth_header = request
        .headers()
        .get("authorization")
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?
        .to_string();

    // Parse the Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    match state.auth.resolve(token).await {
        Ok(identity) => {
            tracing::debug!(
                method = %request_method,
                path = %request_path,
                user_id = %identity.user_id,
                role = %identity.role,
                "Authentication successful"
            );
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(
                method = %request_method,
                path = %request_path,
                error = %e,
                "Authentication failed"
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn protected() -> &'static str {
        "ok"
    }

    fn router(auth_required: bool) -> Router {
        let state = AppState::new(ServerConfig {
            auth_required,
            ..ServerConfig::default()
        });
        Router::new()
            .route("/protected", get(protected))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_auth_disabled_passes_through() {
        let app = router(false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let app = router(true);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let app = router(true);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("authorization", "Basic abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
