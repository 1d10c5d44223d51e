//! Core types for the HyperEVM token feed
//!
//! This crate defines the shared data structures used across the feed:
//! market data records, the realtime wire protocol, and the fixed-precision
//! string formatting every numeric field goes through before leaving the
//! server.

pub mod error;
pub mod fmt;
pub mod market;
pub mod wire;

pub use error::{FeedError, FeedResult};
pub use market::{OrderBook, OrderBookLevel, OrderBookTick, PriceTick, TokenQuote};
pub use wire::{ClientMessage, ServerMessage};
