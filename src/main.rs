//! Server entry point

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bitcode_server::{BroadcastHub, FsAssetStore, ServerResult, SvgBarcodeRenderer, WebServer};

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "bitcode_server")]
#[command(about = "Barcode/QR generator web server with a live visitor counter")]
struct Args {
    /// HTTP port; falls back to the PORT environment variable, then 3000
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory the static assets are read from
    #[arg(long, default_value = ".")]
    static_dir: String,
}

impl Args {
    fn resolve_port(&self) -> u16 {
        self.port
            .or_else(|| {
                std::env::var("PORT")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .unwrap_or(DEFAULT_PORT)
    }
}

#[tokio::main]
async fn main() -> ServerResult<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.resolve_port()));

    let server = WebServer::new(
        FsAssetStore::new(&args.static_dir),
        SvgBarcodeRenderer::new(),
        BroadcastHub::new(),
    );

    server.run(addr).await
}
