//! WebSocket message types for the realtime feed
//!
//! The `type` tag doubles as the event name on the wire, so a pushed price
//! update serializes as `{"type":"priceUpdate",...}`.

use serde::{Deserialize, Serialize};

use crate::market::{OrderBookTick, PriceTick};

/// Messages sent from client to server
///
/// The feed is push-only; a keep-alive ping is the only inbound payload the
/// server acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Keep-alive probe
    Ping { timestamp: i64 },
}

/// Messages pushed from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Periodic simulated price update
    PriceUpdate {
        symbol: String,
        price: String,
        change: String,
    },
    /// Periodic simulated order flow update
    #[serde(rename_all = "camelCase")]
    OrderBookUpdate {
        symbol: String,
        buy_percentage: u8,
        sell_percentage: u8,
    },
    /// Response to a client ping
    #[serde(rename_all = "camelCase")]
    Pong {
        /// Echo back client timestamp
        client_timestamp: i64,
        /// Server timestamp
        server_timestamp: i64,
    },
    /// Error surfaced to the client
    Error { message: String },
}

impl From<PriceTick> for ServerMessage {
    fn from(tick: PriceTick) -> Self {
        ServerMessage::PriceUpdate {
            symbol: tick.symbol,
            price: tick.price,
            change: tick.change,
        }
    }
}

impl From<OrderBookTick> for ServerMessage {
    fn from(tick: OrderBookTick) -> Self {
        ServerMessage::OrderBookUpdate {
            symbol: tick.symbol,
            buy_percentage: tick.buy_percentage,
            sell_percentage: tick.sell_percentage,
        }
    }
}
