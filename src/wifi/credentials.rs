//! Stored access point credentials.
//!
//! A [`CredentialRecord`] is the unit the store keeps per SSID. Its JSON
//! form uses the field names `ssid`, `enc` and `password`; missing fields
//! decode to their empty values. The capitalized and upper-case spellings
//! (`SSID`, `Enc`, `ENC`, `Password`, `PASSWORD`) are accepted on input.
//!
//! # Example
//!
//! ```
//! use wifi_qr::wifi::{CredentialRecord, EncryptionMode};
//!
//! let record: CredentialRecord =
//!     serde_json::from_str(r#"{"ssid":"Home","enc":"WPA2","password":"secret"}"#).unwrap();
//! assert_eq!(record.encryption, EncryptionMode::Wpa);
//! assert!(!record.is_open());
//! ```

use super::EncryptionMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning data for one access point.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialRecord {
    /// Network SSID. Used as the store key.
    #[serde(alias = "SSID", alias = "Ssid")]
    pub ssid: String,
    /// Security mode.
    #[serde(rename = "enc", alias = "Enc", alias = "ENC")]
    pub encryption: EncryptionMode,
    /// Network password (empty for open networks).
    #[serde(alias = "Password", alias = "PASSWORD")]
    pub password: String,
}

impl CredentialRecord {
    /// Create a new record.
    pub fn new(
        ssid: impl Into<String>,
        encryption: EncryptionMode,
        password: impl Into<String>,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            encryption,
            password: password.into(),
        }
    }

    /// Create a record for an open network (no password).
    pub fn open(ssid: impl Into<String>) -> Self {
        Self::new(ssid, EncryptionMode::None, String::new())
    }

    /// Copy of this record with a different password.
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            ssid: self.ssid.clone(),
            encryption: self.encryption,
            password: password.into(),
        }
    }

    /// Check if this is an open network.
    pub fn is_open(&self) -> bool {
        self.encryption == EncryptionMode::None
    }
}

/// Never prints the password.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("ssid", &self.ssid)
            .field("encryption", &self.encryption)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Errors that can occur while validating credential input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Encryption designator is not one of `""`, `WEP`, `WPA`, `WPA2`.
    InvalidEncryption(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncryption(enc) => write!(f, "invalid encryption mode: {:?}", enc),
        }
    }
}

impl std::error::Error for ConfigError {}
