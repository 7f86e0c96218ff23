//! Barcode generator web server
//!
//! Serves a small fixed set of static assets over HTTP and keeps a WebSocket
//! channel per browser client for a live visitor counter and on-demand
//! barcode/QR rendering to SVG.

pub mod error;
pub mod server;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;

// Re-export main types
pub use error::{RenderError, ServerError, ServerResult};
pub use server::WebServer;
pub use state::{ClientConnection, HubState};
pub use types::*;

// Re-export trait definitions
pub use traits::{AssetStore, BarcodeRenderer, ClientHub};

// Re-export service implementations
pub use services::{BroadcastHub, FsAssetStore, SvgBarcodeRenderer};
