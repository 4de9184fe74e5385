//! WiFi credential types.
//!
//! # Components
//!
//! - [`EncryptionMode`] - validated security mode of an access point
//! - [`CredentialRecord`] - SSID, encryption mode and password for one network

mod credentials;
mod encryption;

pub use credentials::{ConfigError, CredentialRecord};
pub use encryption::EncryptionMode;
