//! Type definitions for the server
//!
//! Wire events exchanged with browser clients, barcode render parameters and
//! the static asset allow-list.

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one realtime connection. Never reused across reconnects.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Events the server pushes to browser clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Current visitor count, pushed on every connect and disconnect.
    Visitors(u64),
    /// Reply to a `generate` request; exactly one per request, on the
    /// requesting channel only.
    Bitcode(BitcodeReply),
}

/// Events browser clients send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ClientEvent {
    Generate(RenderParams),
}

/// Outcome of a render request. Exactly one of the fields is present; the
/// absent one is omitted from the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BitcodeReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

impl BitcodeReply {
    pub fn from_result(result: Result<String, crate::error::RenderError>) -> Self {
        match result {
            Ok(svg) => Self {
                error: None,
                svg: Some(svg),
            },
            Err(err) => Self {
                error: Some(err.to_string()),
                svg: None,
            },
        }
    }
}

/// Free-form rendering parameters from the client. Validation is the
/// renderer's job, so every field is optional here and unknown fields are
/// kept rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub symbology: Option<String>,
    /// Bar height (1D) or minimum edge (QR) in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Output selector from the original client protocol. Only string SVG
    /// output is produced, so the value is accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The static asset allow-list and its request-path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Index,
    FaviconPng,
    FaviconIco,
    SiteVerification,
    /// Request path with the leading slash stripped, used verbatim as a
    /// relative file name.
    Sitemap(String),
}

impl Asset {
    /// Map (method, path) onto the allow-list. Anything that does not match
    /// is a 404, including non-GET methods on known paths.
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        if method != Method::GET {
            return None;
        }

        match path {
            "/" => Some(Self::Index),
            "/favicon.png" => Some(Self::FaviconPng),
            "/favicon.ico" => Some(Self::FaviconIco),
            // Ownership-verification page for a third-party indexing
            // service; name and content are fixed.
            "/googlee0d81878ea8f20d1.html" => Some(Self::SiteVerification),
            _ if path.starts_with("/sitemap") => Some(Self::Sitemap(path[1..].to_string())),
            _ => None,
        }
    }

    /// File name relative to the static directory.
    pub fn relative_path(&self) -> &str {
        match self {
            Self::Index => "index.html",
            Self::FaviconPng => "favicon.png",
            Self::FaviconIco => "favicon.ico",
            Self::SiteVerification => "googlee0d81878ea8f20d1.html",
            Self::Sitemap(name) => name,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Index => "text/html; charset=utf-8",
            Self::FaviconPng => "image/png",
            Self::FaviconIco => "image/x-icon",
            Self::SiteVerification => "text/html",
            Self::Sitemap(_) => "text/plain",
        }
    }

    /// Human-readable name used in 500 response bodies and logs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Index => "index page",
            Self::FaviconPng | Self::FaviconIco => "favicon",
            Self::SiteVerification => "google site verification page",
            Self::Sitemap(_) => "sitemap file",
        }
    }
}
