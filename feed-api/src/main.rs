//! HyperEVM token feed server
//!
//! Serves token listings and synthetic order books over HTTP, and pushes
//! simulated market updates to each connected WebSocket client.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use feed_services::{
    FallbackTokenSource, FeedState, ScriptTokenSource, SnapshotGenerator, StaticTokenSource,
    TokenDataSource,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SnapshotGenerator>,
    pub token_source: Arc<dyn TokenDataSource>,
    pub feed: Arc<FeedState>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,feed_api=debug")),
        )
        .init();

    info!("Starting HyperEVM token feed server");

    let generator = Arc::new(SnapshotGenerator::new());

    // Optional external fetch command; seed data covers its absence and
    // any failure.
    let token_source: Arc<dyn TokenDataSource> = match std::env::var("TOKEN_FETCH_CMD") {
        Ok(cmd) if !cmd.trim().is_empty() => {
            info!("Token fetch command configured: {}", cmd);
            Arc::new(FallbackTokenSource::new(ScriptTokenSource::new(&cmd)))
        }
        _ => {
            info!("No TOKEN_FETCH_CMD configured - serving seed token data");
            Arc::new(StaticTokenSource)
        }
    };

    let feed = Arc::new(FeedState::new(Arc::clone(&generator)));

    let state = AppState {
        generator,
        token_source,
        feed,
    };

    // Configure CORS for the frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::ws_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
