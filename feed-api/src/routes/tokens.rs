//! Token listing and order book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use crate::AppState;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create token routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tokens", get(list_tokens))
        .route("/orderbook/{symbol}", get(get_orderbook))
}

/// List the tracked token quotes
///
/// The configured source is fallback-wrapped, so an upstream outage still
/// produces a 200 with seed data.
async fn list_tokens(State(state): State<AppState>) -> impl IntoResponse {
    match state.token_source.fetch_tokens().await {
        Ok(tokens) => {
            info!("Returning {} token quotes", tokens.len());
            (StatusCode::OK, Json(tokens)).into_response()
        }
        Err(e) => {
            error!("Failed to build token list: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Synthetic order book for the requested symbol
///
/// Accepts any non-empty symbol; the book's shape does not depend on the
/// symbol being a tracked listing.
async fn get_orderbook(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    info!("Building order book for {}", symbol);
    let book = state.generator.order_book(&symbol);
    (StatusCode::OK, Json(book)).into_response()
}
