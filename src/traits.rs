//! Service trait definitions for dependency injection
//!
//! All I/O operations are abstracted through these traits for testability

use async_trait::async_trait;

use crate::error::{RenderError, ServerResult};
use crate::state::ClientConnection;
use crate::types::{Asset, ClientId, RenderParams, ServerEvent};

/// Static asset access. Assets are re-read per request; the file system is
/// treated as a read-only blob store keyed by path.
#[mockall::automock]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Read the full content of an allow-listed asset.
    async fn load(&self, asset: &Asset) -> ServerResult<Vec<u8>>;
}

/// The barcode rendering collaborator: parameters in, SVG string or error
/// out. Render failures are values, never channel faults.
#[mockall::automock]
#[async_trait]
pub trait BarcodeRenderer: Send + Sync {
    async fn render(&self, params: &RenderParams) -> Result<String, RenderError>;
}

/// Connection registry plus visitor-counter broadcast semantics.
#[mockall::automock]
#[async_trait]
pub trait ClientHub: Send + Sync {
    /// Register a connection, push the fresh visitor count to it and
    /// broadcast the same count to all other connections. Returns the count.
    async fn connect(&self, connection: ClientConnection) -> u64;

    /// Unregister a connection and broadcast the decremented count to the
    /// remaining ones. `None` if the id was never registered.
    async fn disconnect(&self, id: ClientId) -> Option<u64>;

    /// Deliver an event to one specific connection.
    async fn send_to(&self, id: ClientId, event: ServerEvent) -> ServerResult<()>;

    /// Current visitor count.
    async fn visitor_count(&self) -> u64;
}
