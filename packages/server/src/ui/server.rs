//! Router and server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{
    handler::{
        get_config, get_connections, get_store_tree, get_store_value, get_world, health_check,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};
use crate::{app::App, config::Config};

/// Build the router of the game server.
///
/// Every path that is not an API route is served from the static directory.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/config", get(get_config))
        .route("/api/world", get(get_world))
        .route("/api/connections", get(get_connections))
        .route("/api/store", get(get_store_tree))
        .route("/api/store/{*key_path}", get(get_store_value))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bounce game server
///
/// # Example
///
/// ```ignore
/// let config = Config::default();
/// Server::new(config).run().await?;
/// ```
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until Ctrl+C / SIGTERM, then stop the game loop and close every connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let app = App::start(self.config);

        // Bind the server to the host and port
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tracing::info!("Bounce server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?client_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        app.shutdown().await;
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
