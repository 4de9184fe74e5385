//! Access point encryption modes.
//!
//! The provisioning payload only distinguishes three security modes, so WPA2
//! is folded into WPA when parsed. Parsing is case-sensitive.
//!
//! # Example
//!
//! ```
//! use wifi_qr::wifi::EncryptionMode;
//!
//! let mode: EncryptionMode = "WPA2".parse().unwrap();
//! assert_eq!(mode, EncryptionMode::Wpa);
//! assert_eq!(mode.as_str(), "WPA");
//! assert!("wpa".parse::<EncryptionMode>().is_err());
//! ```

use super::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Security protocol of an access point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EncryptionMode {
    /// Open network.
    #[default]
    None,
    /// WEP.
    Wep,
    /// WPA or WPA2.
    Wpa,
}

impl EncryptionMode {
    /// Parse a client-supplied encryption designator.
    ///
    /// Accepts exactly `""`, `"WEP"`, `"WPA"` and `"WPA2"`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "" => Ok(Self::None),
            "WEP" => Ok(Self::Wep),
            "WPA" | "WPA2" => Ok(Self::Wpa),
            _ => Err(ConfigError::InvalidEncryption(s.to_string())),
        }
    }

    /// Text used in the provisioning payload and JSON responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
        }
    }
}

impl std::str::FromStr for EncryptionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EncryptionMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EncryptionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
