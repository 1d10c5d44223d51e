//! Realtime push subsystem
//!
//! Connection lifecycle and the per-connection update scheduler.

mod handler;
mod registry;

pub use handler::{FeedState, DEFAULT_TICK_INTERVAL};
pub use registry::{ClientId, ConnectionInfo, ConnectionRegistry};
