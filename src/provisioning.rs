//! WiFi provisioning payloads and QR rendering.
//!
//! Scanners join a network from a QR code holding a text payload of the form
//!
//! ```text
//! WIFI:S:<ssid>;:T:<encryption>;P:<password>;;
//! ```
//!
//! The SSID and password are inserted verbatim. Delimiter characters
//! (`;`, `:`, `\`) inside them are not escaped, so such values produce a
//! payload scanners may misread. The `:` before `T:` is part of the layout
//! existing clients were issued and must be kept.
//!
//! # Example
//!
//! ```
//! use wifi_qr::provisioning::{encode_qr, render_payload};
//! use wifi_qr::wifi::{CredentialRecord, EncryptionMode};
//!
//! let record = CredentialRecord::new("Home", EncryptionMode::Wpa, "secret");
//! let payload = render_payload(&record);
//! assert_eq!(payload, "WIFI:S:Home;:T:WPA;P:secret;;");
//!
//! let png = encode_qr(&payload).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

use crate::wifi::CredentialRecord;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::fmt;
use std::io::Cursor;

/// Error correction used for every symbol (~25% recoverable).
pub const ERROR_CORRECTION: EcLevel = EcLevel::Q;

/// Render the provisioning payload for a record.
pub fn render_payload(record: &CredentialRecord) -> String {
    format!(
        "WIFI:S:{};:T:{};P:{};;",
        record.ssid, record.encryption, record.password
    )
}

/// Encode text as a QR symbol and return it as PNG bytes.
pub fn encode_qr(text: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), ERROR_CORRECTION)
        .map_err(|e| QrError::EncodingFailed(e.to_string()))?;

    let image = code.render::<Luma<u8>>().build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| QrError::ImageFailed(e.to_string()))?;
    Ok(png)
}

/// Render a record straight to a PNG QR code.
pub fn render_qr_png(record: &CredentialRecord) -> Result<Vec<u8>, QrError> {
    encode_qr(&render_payload(record))
}

/// QR rendering errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// Text does not fit a QR symbol at the configured error correction level.
    EncodingFailed(String),
    /// The symbol could not be written as PNG.
    ImageFailed(String),
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodingFailed(msg) => write!(f, "QR encoding failed: {}", msg),
            Self::ImageFailed(msg) => write!(f, "PNG output failed: {}", msg),
        }
    }
}

impl std::error::Error for QrError {}
