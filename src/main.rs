use axum::{middleware, Router};
use tokio::net::TcpListener;

use anyhow::anyhow;

use telequeue::{middleware::auth::auth_middleware, routes, state::AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();
    tracing::info!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config);

    // Create protected API routes with authentication middleware
    let protected_routes = routes::api::create_api_router().layer(middleware::from_fn_with_state(
        app_state.clone(),
        auth_middleware,
    ));

    // WebSocket routes authenticate in-band via the identify message
    let ws_routes = routes::ws::create_ws_router();

    // Create public health check route (no auth)
    let public_routes =
        Router::new().route("/", axum::routing::get(telequeue::handlers::api::health_check));

    // Combine all routes: public + protected + websocket
    let app = public_routes
        .merge(protected_routes)
        .merge(ws_routes)
        .with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    tracing::info!("Server listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
