//! Market data records served over HTTP and pushed over the realtime feed
//!
//! Every numeric field is a pre-formatted string (see [`crate::fmt`]);
//! records are regenerated per request, never mutated.

use serde::{Deserialize, Serialize};

/// A single market-data record for one tracked listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuote {
    /// Ticker symbol, unique per listing
    pub symbol: String,
    /// Last price, 8 fractional digits
    pub price: String,
    /// Signed 24h change, e.g. `+11.26%`
    pub change_24h: String,
    /// Human-readable 24h volume, e.g. `157K`
    pub volume: String,
}

/// One price level of a synthetic order book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookLevel {
    /// Level price, 8 fractional digits
    pub price: String,
    /// Resting amount, 2 fractional digits
    pub amount: String,
}

/// Simulated outstanding buy and sell levels for a symbol
///
/// Bids descend from the base price, asks ascend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

/// Compact price update pushed over the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: String,
    pub price: String,
    pub change: String,
}

/// Simulated buy/sell pressure pushed over the realtime channel
///
/// The two percentages are sampled independently and need not sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookTick {
    pub symbol: String,
    pub buy_percentage: u8,
    pub sell_percentage: u8,
}
