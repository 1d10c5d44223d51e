//! WebSocket route handler
//!
//! Upgrades the HTTP connection and adapts axum's socket to the
//! tungstenite-typed transport the feed service expects.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    extract::{
        ws::{self, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{Sink, Stream};
use tokio_tungstenite::tungstenite;
use tracing::info;

use crate::AppState;

/// Create WebSocket routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| async move {
        state.feed.handle_connection(FeedSocket(socket)).await;
    })
}

/// Adapter translating between axum's WebSocket messages and the
/// tungstenite types used at the service seam
struct FeedSocket(WebSocket);

fn to_tungstenite(msg: ws::Message) -> tungstenite::Message {
    match msg {
        ws::Message::Text(text) => tungstenite::Message::Text(text.to_string().into()),
        ws::Message::Binary(data) => tungstenite::Message::Binary(data.to_vec().into()),
        ws::Message::Ping(data) => tungstenite::Message::Ping(data.to_vec().into()),
        ws::Message::Pong(data) => tungstenite::Message::Pong(data.to_vec().into()),
        ws::Message::Close(_) => tungstenite::Message::Close(None),
    }
}

fn from_tungstenite(msg: tungstenite::Message) -> Option<ws::Message> {
    match msg {
        tungstenite::Message::Text(text) => Some(ws::Message::Text(text.to_string().into())),
        tungstenite::Message::Binary(data) => Some(ws::Message::Binary(data.to_vec().into())),
        tungstenite::Message::Ping(data) => Some(ws::Message::Ping(data.to_vec().into())),
        tungstenite::Message::Pong(data) => Some(ws::Message::Pong(data.to_vec().into())),
        tungstenite::Message::Close(_) => Some(ws::Message::Close(None)),
        // Raw frames never cross the seam
        tungstenite::Message::Frame(_) => None,
    }
}

fn to_transport_error(e: axum::Error) -> tungstenite::Error {
    tungstenite::Error::Io(io::Error::other(e))
}

impl Stream for FeedSocket {
    type Item = Result<tungstenite::Message, tungstenite::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.0).poll_next(cx) {
            Poll::Ready(Some(Ok(msg))) => Poll::Ready(Some(Ok(to_tungstenite(msg)))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(to_transport_error(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Sink<tungstenite::Message> for FeedSocket {
    type Error = tungstenite::Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.0).poll_ready(cx).map_err(to_transport_error)
    }

    fn start_send(mut self: Pin<&mut Self>, item: tungstenite::Message) -> Result<(), Self::Error> {
        match from_tungstenite(item) {
            Some(msg) => Pin::new(&mut self.0)
                .start_send(msg)
                .map_err(to_transport_error),
            None => Ok(()),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.0).poll_flush(cx).map_err(to_transport_error)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.0).poll_close(cx).map_err(to_transport_error)
    }
}
