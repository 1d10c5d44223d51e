//! Connection registry
//!
//! Tracks live realtime connections for observability. No market data or
//! scheduling state crosses connections; each one's scheduler is owned by
//! its handler task.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Unique identifier for a realtime client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Per-connection bookkeeping
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connected_at: DateTime<Utc>,
}

/// Registry of live connections
pub struct ConnectionRegistry {
    next_client_id: AtomicU64,
    connections: DashMap<ClientId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_client_id: AtomicU64::new(1),
            connections: DashMap::new(),
        }
    }

    /// Register a new connection and allocate its id
    pub fn register(&self) -> ClientId {
        let client_id = ClientId(self.next_client_id.fetch_add(1, Ordering::SeqCst));
        self.connections.insert(
            client_id,
            ConnectionInfo {
                connected_at: Utc::now(),
            },
        );
        debug!("Registered connection {}", client_id);
        client_id
    }

    /// Remove a connection; a no-op when it is already gone
    pub fn remove(&self, client_id: ClientId) {
        if self.connections.remove(&client_id).is_some() {
            info!("Connection {} removed", client_id);
        }
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.connections.contains_key(&client_id)
    }

    pub fn connection_info(&self, client_id: ClientId) -> Option<ConnectionInfo> {
        self.connections.get(&client_id).map(|info| info.clone())
    }

    /// Number of currently connected clients
    pub fn total_clients(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("total_clients", &self.total_clients())
            .finish()
    }
}
