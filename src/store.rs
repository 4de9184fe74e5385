//! In-memory credential store.
//!
//! Maps SSID to [`CredentialRecord`] behind a single reader/writer lock over
//! the whole map. Lookups run concurrently; any write excludes all readers
//! and writers for its duration. Records are never handed out by reference:
//! [`CredentialStore::get`] returns a clone.
//!
//! Nothing is persisted. All records are lost when the process exits.
//!
//! # Example
//!
//! ```
//! use wifi_qr::store::CredentialStore;
//! use wifi_qr::wifi::{CredentialRecord, EncryptionMode};
//!
//! let store = CredentialStore::new();
//! store.upsert(CredentialRecord::new("Home", EncryptionMode::Wpa, "secret"));
//! store.update_password("Home", "hunter22").unwrap();
//! assert_eq!(store.get("Home").unwrap().password, "hunter22");
//! ```

use crate::wifi::CredentialRecord;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe SSID → credential map.
#[derive(Debug, Default)]
pub struct CredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record with the same SSID.
    ///
    /// The SSID is not checked for emptiness.
    pub fn upsert(&self, record: CredentialRecord) {
        debug!("Upserting credentials for {:?}", record.ssid);
        self.write().insert(record.ssid.clone(), record);
    }

    /// Replace the password of an existing record.
    ///
    /// The lookup and the replacement happen under one write lock, so a
    /// concurrent writer to the same SSID can't interleave with it.
    pub fn update_password(&self, ssid: &str, password: &str) -> Result<(), StoreError> {
        let mut records = self.write();
        let record = records
            .get_mut(ssid)
            .ok_or_else(|| StoreError::NotFound(ssid.to_string()))?;
        *record = record.with_password(password);
        debug!("Updated password for {:?}", ssid);
        Ok(())
    }

    /// Get a copy of the record stored under `ssid`.
    pub fn get(&self, ssid: &str) -> Result<CredentialRecord, StoreError> {
        self.read()
            .get(ssid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(ssid.to_string()))
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every write is a single insert or field replacement, so the map is
    // consistent even if a holder panicked.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CredentialRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CredentialRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists for the SSID.
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(ssid) => write!(f, "no credentials for SSID {:?}", ssid),
        }
    }
}

impl std::error::Error for StoreError {}
