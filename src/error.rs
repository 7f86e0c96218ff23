//! Server-specific error types

use thiserror::Error;

use crate::types::ClientId;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("server startup failed: {0}")]
    Startup(String),

    /// The message doubles as the 500 response body, so it keeps the
    /// `unable to load <asset>: <cause>` shape clients already depend on.
    #[error("unable to load {description}: {source}")]
    AssetUnavailable {
        description: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("client {client_id} is no longer connected")]
    ClientGone { client_id: ClientId },
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Failures of the rendering collaborator. These are values, not faults:
/// they travel back to the requesting channel inside the `bitcode` payload
/// and never close the connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("data is required")]
    MissingData,

    #[error("type is required")]
    MissingSymbology,

    #[error("unsupported barcode type: {0}")]
    UnsupportedSymbology(String),

    #[error("{0}")]
    Encode(String),
}
