//! WiFi QR provisioning service library.
//!
//! Stores access point credentials in memory, keyed by SSID, and renders
//! them as QR codes holding the `WIFI:` provisioning payload.

pub mod network;
pub mod provisioning;
pub mod store;
pub mod wifi;

// Re-export commonly used items
pub use network::{HttpServer, ServerConfig, DEFAULT_PORT};
pub use provisioning::{encode_qr, render_payload, render_qr_png, QrError};
pub use store::{CredentialStore, StoreError};
pub use wifi::{ConfigError, CredentialRecord, EncryptionMode};
