//! Realtime hub state
//!
//! The registry of active connections is the single shared mutable resource.
//! The visitor count is the registry size read under the same lock as the
//! insert/remove, so a count can never go negative and every broadcast
//! carries the value produced by the mutation that triggered it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use crate::types::{ClientId, ServerEvent};

/// One realtime channel as the hub sees it. The queue to each client is
/// unbounded so a slow reader delays only its own socket writes and never
/// loses a visitor-count update.
#[derive(Debug)]
pub struct ClientConnection {
    pub id: ClientId,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
    pub connected_at: DateTime<Utc>,
}

impl ClientConnection {
    pub fn new(id: ClientId, sender: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id,
            sender,
            connected_at: Utc::now(),
        }
    }
}

type PeerSenders = Vec<(ClientId, mpsc::UnboundedSender<ServerEvent>)>;

/// Registry of active connections.
#[derive(Debug, Default)]
pub struct HubState {
    clients: RwLock<HashMap<ClientId, ClientConnection>>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection and snapshot the other peers' senders under one
    /// lock. The returned count is the value the caller must broadcast.
    pub async fn join(&self, connection: ClientConnection) -> (u64, PeerSenders) {
        let mut clients = self.clients.write().await;
        let id = connection.id;
        clients.insert(id, connection);

        let others = clients
            .iter()
            .filter(|(peer, _)| **peer != id)
            .map(|(peer, conn)| (*peer, conn.sender.clone()))
            .collect();

        (clients.len() as u64, others)
    }

    /// Remove a connection and snapshot the remaining peers' senders.
    /// Returns `None` if the id was never registered, so a connection that
    /// never completed establishment cannot decrement the count.
    pub async fn leave(&self, id: ClientId) -> Option<(u64, PeerSenders)> {
        let mut clients = self.clients.write().await;
        clients.remove(&id)?;

        let remaining = clients
            .iter()
            .map(|(peer, conn)| (*peer, conn.sender.clone()))
            .collect();

        Some((clients.len() as u64, remaining))
    }

    pub async fn sender_of(&self, id: ClientId) -> Option<mpsc::UnboundedSender<ServerEvent>> {
        let clients = self.clients.read().await;
        clients.get(&id).map(|conn| conn.sender.clone())
    }

    pub async fn visitor_count(&self) -> u64 {
        let clients = self.clients.read().await;
        clients.len() as u64
    }
}
