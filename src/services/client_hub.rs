//! Broadcast hub service implementation
//!
//! Owns the connection registry and implements the visitor-counter push
//! semantics: connect pushes the fresh count to the new channel and
//! broadcasts it to every other channel, disconnect broadcasts to the
//! remaining ones.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{ServerError, ServerResult};
use crate::state::{ClientConnection, HubState};
use crate::traits::ClientHub;
use crate::types::{ClientId, ServerEvent};

/// Registry-backed hub shared across connection tasks.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    state: Arc<HubState>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to a snapshot of peers. The per-client queues are
    /// unbounded, so the only failure is a closed channel whose connection
    /// is about to unregister itself; no peer ever misses a count update.
    fn fan_out(targets: Vec<(ClientId, mpsc::UnboundedSender<ServerEvent>)>, event: &ServerEvent) {
        for (peer, sender) in targets {
            if sender.send(event.clone()).is_err() {
                debug!(client_id = %peer, "client channel closed during broadcast");
            }
        }
    }
}

#[async_trait]
impl ClientHub for BroadcastHub {
    async fn connect(&self, connection: ClientConnection) -> u64 {
        let id = connection.id;
        let own_sender = connection.sender.clone();

        // Registration and the peer snapshot happen under one lock, so the
        // count sent below is exactly the one this registration produced.
        let (count, others) = self.state.join(connection).await;

        if own_sender.send(ServerEvent::Visitors(count)).is_err() {
            debug!(client_id = %id, "client went away before the initial visitor push");
        }
        Self::fan_out(others, &ServerEvent::Visitors(count));

        count
    }

    async fn disconnect(&self, id: ClientId) -> Option<u64> {
        let (count, remaining) = self.state.leave(id).await?;
        Self::fan_out(remaining, &ServerEvent::Visitors(count));
        Some(count)
    }

    async fn send_to(&self, id: ClientId, event: ServerEvent) -> ServerResult<()> {
        let sender = self
            .state
            .sender_of(id)
            .await
            .ok_or(ServerError::ClientGone { client_id: id })?;

        sender
            .send(event)
            .map_err(|_| ServerError::ClientGone { client_id: id })
    }

    async fn visitor_count(&self) -> u64 {
        self.state.visitor_count().await
    }
}
