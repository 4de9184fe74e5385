//! HTTP surface of the service.
//!
//! # Components
//!
//! - [`config`] - port, bind address and worker count from flags/environment
//! - [`handlers`] - request routing against the credential store
//! - [`server`] - `tiny_http` listener and worker pool
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifi_qr::network::{HttpServer, ServerConfig};
//! use wifi_qr::store::CredentialStore;
//!
//! let store = Arc::new(CredentialStore::new());
//! let server = HttpServer::start(&ServerConfig::default(), store)?;
//! println!("listening on {}", server.local_addr());
//! # Ok::<(), wifi_qr::network::ServerError>(())
//! ```

pub mod config;
pub mod handlers;
mod server;

pub use config::{usage, ArgsError, CliAction, ServerConfig, DEFAULT_PORT};
pub use handlers::{route, Reply};
pub use server::{HttpServer, MAX_BODY_BYTES};

use crate::provisioning::QrError;
use crate::store::StoreError;

/// Errors raised while handling a request.
#[derive(Debug)]
pub enum RequestError {
    /// Body or parameters could not be decoded, including an invalid
    /// encryption mode.
    Malformed(String),
    /// No record for the requested SSID.
    NotFound(String),
    /// The record could not be rendered as a QR code.
    Encoding(QrError),
}

impl RequestError {
    /// HTTP status reported to the client.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Malformed(_) | Self::Encoding(_) => 400,
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed request: {}", msg),
            Self::NotFound(ssid) => write!(f, "no credentials for SSID {:?}", ssid),
            Self::Encoding(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<StoreError> for RequestError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(ssid) => Self::NotFound(ssid),
        }
    }
}

impl From<QrError> for RequestError {
    fn from(e: QrError) -> Self {
        Self::Encoding(e)
    }
}

/// Errors starting the server.
#[derive(Debug)]
pub enum ServerError {
    /// The listener could not be bound.
    Bind(String),
    /// A worker thread could not be spawned.
    Io(std::io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind(msg) => write!(f, "failed to bind {}", msg),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
