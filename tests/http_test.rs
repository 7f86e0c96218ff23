//! Static responder integration tests
//!
//! Drives the router directly with one-shot requests and checks the exact
//! status/content-type/body contracts of the allow-list.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use bitcode_server::{BroadcastHub, FsAssetStore, SvgBarcodeRenderer, WebServer};

fn router_for(dir: &TempDir) -> Router {
    WebServer::new(
        FsAssetStore::new(dir.path()),
        SvgBarcodeRenderer::new(),
        BroadcastHub::new(),
    )
    .build_router()
}

fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>barcodes</html>").unwrap();
    std::fs::write(dir.path().join("favicon.png"), [0x89, b'P', b'N', b'G']).unwrap();
    std::fs::write(dir.path().join("favicon.ico"), [0x00, 0x00, 0x01, 0x00]).unwrap();
    std::fs::write(
        dir.path().join("googlee0d81878ea8f20d1.html"),
        "google-site-verification",
    )
    .unwrap();
    std::fs::write(dir.path().join("sitemap.xml"), "<urlset/>").unwrap();
    dir
}

async fn get(router: &Router, path: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn test_allow_listed_paths_serve_exact_content() {
    let dir = fixture_dir();
    let router = router_for(&dir);

    let (status, content_type, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(body, b"<html>barcodes</html>");

    let (status, content_type, body) = get(&router, "/favicon.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(body, [0x89, b'P', b'N', b'G']);

    let (status, content_type, _) = get(&router, "/favicon.ico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/x-icon"));

    let (status, content_type, body) = get(&router, "/googlee0d81878ea8f20d1.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(body, b"google-site-verification");

    let (status, content_type, body) = get(&router, "/sitemap.xml").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, b"<urlset/>");
}

#[tokio::test]
async fn test_unknown_paths_and_methods_get_404() {
    let dir = fixture_dir();
    let router = router_for(&dir);

    let (status, _, body) = get(&router, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"not found");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"not found");
}

#[tokio::test]
async fn test_sitemap_prefix_maps_to_literal_file_name() {
    let dir = fixture_dir();
    std::fs::write(dir.path().join("sitemapXYZ"), "literal name").unwrap();
    let router = router_for(&dir);

    let (status, content_type, body) = get(&router, "/sitemapXYZ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, b"literal name");

    // No such file: the literal mapping is attempted and fails with 500.
    let (status, _, body) = get(&router, "/sitemap-missing").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body).unwrap();
    assert!(body.starts_with("unable to load sitemap file:"), "{body}");
}

#[tokio::test]
async fn test_malformed_request_gets_400_from_server_stack() {
    let dir = fixture_dir();
    let router = router_for(&dir);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _dir = dir;
        axum::serve(listener, router).await.unwrap();
    });

    // A request line no HTTP parser accepts; the transport answers with a
    // 400 before any handler runs.
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"THIS IS NOT HTTP\r\n\r\n").await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 400"), "{response}");
}

#[tokio::test]
async fn test_missing_asset_is_500_and_server_survives() {
    let dir = fixture_dir();
    std::fs::remove_file(dir.path().join("favicon.png")).unwrap();
    let router = router_for(&dir);

    let (status, _, body) = get(&router, "/favicon.png").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body).unwrap();
    assert!(body.starts_with("unable to load favicon:"), "{body}");
    assert!(body.len() > "unable to load favicon:".len(), "missing cause");

    // One request's failure must not affect the next exchange.
    let (status, _, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>barcodes</html>");
}
