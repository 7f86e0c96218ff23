//! Service implementations
//!
//! Real implementations of all service traits for production use

pub mod asset_store;
pub mod barcode_renderer;
pub mod client_hub;

// Re-export service implementations
pub use asset_store::FsAssetStore;
pub use barcode_renderer::SvgBarcodeRenderer;
pub use client_hub::BroadcastHub;
