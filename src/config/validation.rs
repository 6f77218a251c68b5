/// Validate that when auth is required, at least one auth method is configured
///
/// Checks that either the remote auth service URL or a local JWT secret is
/// present when authentication is required.
pub fn validate_auth_required(
    auth_required: bool,
    auth_service_url: &Option<String>,
    auth_jwt_secret: &Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !auth_required {
        return Ok(());
    }

    if auth_service_url.is_none() && auth_jwt_secret.is_none() {
        return Err(
            "When AUTH_REQUIRED=true, either AUTH_SERVICE_URL or AUTH_JWT_SECRET must be configured"
                .into(),
        );
    }

    Ok(())
}
