//! Main server implementation
//!
//! `WebServer` composes the three injected services and exposes one axum
//! router: a fallback handler for the static allow-list and a WebSocket
//! route for the realtime hub. Every connection runs in its own task, so a
//! slow file read or render call stalls only the exchange waiting on it.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::error::{ServerError, ServerResult};
use crate::state::ClientConnection;
use crate::traits::{AssetStore, BarcodeRenderer, ClientHub};
use crate::types::{Asset, BitcodeReply, ClientEvent, ClientId, ServerEvent};

/// Main server struct with dependency injection
#[derive(Clone)]
pub struct WebServer<A, R, H>
where
    A: AssetStore,
    R: BarcodeRenderer,
    H: ClientHub,
{
    assets: A,
    renderer: R,
    hub: H,
}

impl<A, R, H> WebServer<A, R, H>
where
    A: AssetStore + Clone + Send + Sync + 'static,
    R: BarcodeRenderer + Clone + Send + Sync + 'static,
    H: ClientHub + Clone + Send + Sync + 'static,
{
    /// Create a new server with injected services
    pub fn new(assets: A, renderer: R, hub: H) -> Self {
        Self {
            assets,
            renderer,
            hub,
        }
    }

    /// Build the axum router: the WebSocket route plus a fallback that
    /// dispatches the static allow-list, so unmatched method/path pairs
    /// all end up as 404 rather than 405.
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .fallback(static_handler)
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()).into_inner())
            .with_state(self.clone())
    }

    /// Bind and serve until ctrl-c.
    pub async fn run(&self, addr: SocketAddr) -> ServerResult<()> {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Startup(format!("failed to bind {addr}: {err}")))?;

        info!("http server listening on port {}", addr.port());

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await
            .map_err(|err| ServerError::Startup(format!("server error: {err}")))
    }
}

// HTTP handlers

/// Static responder: one response per one-shot request, per the allow-list.
async fn static_handler<A, R, H>(
    State(server): State<WebServer<A, R, H>>,
    method: Method,
    uri: Uri,
) -> Response
where
    A: AssetStore + Clone + Send + Sync + 'static,
    R: BarcodeRenderer + Clone + Send + Sync + 'static,
    H: ClientHub + Clone + Send + Sync + 'static,
{
    let Some(asset) = Asset::resolve(&method, uri.path()) else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    match server.assets.load(&asset).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, asset.content_type())],
            content,
        )
            .into_response(),
        Err(err) => {
            error!(path = uri.path(), "{err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Upgrade to a realtime channel.
async fn websocket_handler<A, R, H>(
    ws: WebSocketUpgrade,
    State(server): State<WebServer<A, R, H>>,
) -> impl IntoResponse
where
    A: AssetStore + Clone + Send + Sync + 'static,
    R: BarcodeRenderer + Clone + Send + Sync + 'static,
    H: ClientHub + Clone + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| handle_socket(socket, server))
}

/// One realtime connection: Connecting → Connected → Disconnected.
async fn handle_socket<A, R, H>(socket: WebSocket, server: WebServer<A, R, H>)
where
    A: AssetStore + Clone + Send + Sync + 'static,
    R: BarcodeRenderer + Clone + Send + Sync + 'static,
    H: ClientHub + Clone + Send + Sync + 'static,
{
    let client_id = ClientId::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let (mut sink, mut stream) = socket.split();

    // Outgoing pump: everything the hub queues for this connection goes out
    // as one JSON text frame per event.
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(err) => {
                    error!("failed to serialize outgoing event: {err}");
                    continue;
                }
            };
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Connecting → Connected: register, push the fresh count to this
    // channel and broadcast it to all others.
    let count = server
        .hub
        .connect(ClientConnection::new(client_id, event_tx))
        .await;
    info!("visitor connected");
    info!("{count} visitor(s) connected");

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::Generate(params)) => {
                    // Exactly one bitcode reply per generate request; render
                    // failures go into the payload, not onto the channel.
                    let reply = BitcodeReply::from_result(server.renderer.render(&params).await);
                    if let Some(render_error) = &reply.error {
                        debug!(client_id = %client_id, "render failed: {render_error}");
                    }
                    if let Err(err) = server
                        .hub
                        .send_to(client_id, ServerEvent::Bitcode(reply))
                        .await
                    {
                        warn!(client_id = %client_id, "failed to deliver bitcode reply: {err}");
                        break;
                    }
                }
                Err(err) => {
                    warn!(client_id = %client_id, "unparseable client frame: {err}");
                }
            },
            Ok(Message::Close(_)) => break,
            // Binary frames are not part of the protocol; axum answers
            // pings itself.
            Ok(_) => {}
            Err(err) => {
                warn!(client_id = %client_id, "websocket error: {err}");
                break;
            }
        }
    }

    // Connected → Disconnected: unregister and broadcast the decremented
    // count to the remaining channels.
    if let Some(count) = server.hub.disconnect(client_id).await {
        info!("visitor disconnected");
        info!("{count} visitor(s) connected");
    }
    send_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::traits::MockBarcodeRenderer;
    use crate::types::RenderParams;

    #[tokio::test]
    async fn test_render_failure_becomes_payload_error() {
        let mut renderer = MockBarcodeRenderer::new();
        renderer
            .expect_render()
            .returning(|_| Err(RenderError::MissingData));

        let reply = BitcodeReply::from_result(renderer.render(&RenderParams::default()).await);
        assert_eq!(reply.error.as_deref(), Some("data is required"));
        assert!(reply.svg.is_none());
    }

    #[tokio::test]
    async fn test_render_success_becomes_payload_svg() {
        let mut renderer = MockBarcodeRenderer::new();
        renderer
            .expect_render()
            .returning(|_| Ok("<svg/>".to_string()));

        let reply = BitcodeReply::from_result(renderer.render(&RenderParams::default()).await);
        assert_eq!(reply.svg.as_deref(), Some("<svg/>"));
        assert!(reply.error.is_none());
    }
}
