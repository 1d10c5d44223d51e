//! Business logic for the HyperEVM token feed
//!
//! Snapshot generation, token data sources, and the realtime push
//! subsystem.

pub mod realtime;
pub mod snapshot;
pub mod source;

pub use realtime::{ClientId, ConnectionRegistry, FeedState, DEFAULT_TICK_INTERVAL};
pub use snapshot::{SnapshotGenerator, BOOK_DEPTH, SYMBOLS};
pub use source::{FallbackTokenSource, ScriptTokenSource, StaticTokenSource, TokenDataSource};
