//! In-memory registry of authenticated plugin connections.

use kavex_core::OutboundFrame;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Write side of one live socket.
pub type FrameSender = mpsc::UnboundedSender<OutboundFrame>;

/// A live, authenticated socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Process-unique socket id
    pub id: u64,
    /// Server name announced at auth
    pub server_name: String,
    /// Frames written here are sent on the socket
    pub sender: FrameSender,
}

/// Live connections keyed by token hash, at most one per hash.
///
/// Registering a hash that is already present replaces the previous handle
/// without closing its socket; the old socket keeps running until it closes
/// on its own, and its teardown is then recognised as stale.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, ConnectionHandle>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a socket id.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register `handle` for `token_hash`, returning the handle it replaced.
    pub fn register(&self, token_hash: &str, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.connections
            .lock()
            .insert(token_hash.to_string(), handle)
    }

    /// Remove the entry for `token_hash` only if it still belongs to socket `id`.
    pub fn remove_if_current(&self, token_hash: &str, id: u64) -> bool {
        let mut connections = self.connections.lock();
        match connections.get(token_hash) {
            Some(handle) if handle.id == id => {
                connections.remove(token_hash);
                true
            }
            _ => false,
        }
    }

    /// Registered handle for `token_hash`.
    pub fn get(&self, token_hash: &str) -> Option<ConnectionHandle> {
        self.connections.lock().get(token_hash).cloned()
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}
