//! RAM mirror of the settings table
//!
//! Navigation reads and writes the mirror synchronously. After a commit the
//! firmware serializes the table with postcard and writes it to flash; a
//! failed flash write leaves the clock running on the volatile copy.

use horologe_core::traits::{FieldId, PersistentStore};
use serde::{Deserialize, Serialize};

/// Layout version of [`StoredSettings`]
pub const STORE_VERSION: u8 = 1;

/// Upper bound on the serialized size (varint i32 is at most 5 bytes)
pub const MAX_BLOB_SIZE: usize = 1 + FieldId::COUNT * 5;

/// Serialized form of the settings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    pub version: u8,
    pub values: [i32; FieldId::COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Blob is not a postcard-encoded settings table
    Decode,
    /// Blob was written by an incompatible layout
    Version,
    /// Output buffer too small
    Encode,
}

pub struct MirroredStore {
    values: [i32; FieldId::COUNT],
    /// Written since the last flush
    dirty: bool,
    /// Committed and waiting for the firmware to persist
    flush: bool,
}

impl Default for MirroredStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MirroredStore {
    /// Factory values, nothing pending
    pub fn new() -> Self {
        Self {
            values: FieldId::ALL.map(FieldId::default_value),
            dirty: false,
            flush: false,
        }
    }

    /// Restore from a flash blob, replacing out-of-range values
    pub fn load(blob: &[u8]) -> Result<Self, StoreError> {
        let stored: StoredSettings = postcard::from_bytes(blob).map_err(|_| StoreError::Decode)?;
        if stored.version != STORE_VERSION {
            return Err(StoreError::Version);
        }
        let mut store = Self::new();
        for id in FieldId::ALL {
            store.values[id.index()] = id.sanitize(stored.values[id.index()]);
        }
        Ok(store)
    }

    /// Serialize the table into `buf`
    pub fn to_blob<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], StoreError> {
        let stored = StoredSettings {
            version: STORE_VERSION,
            values: self.values,
        };
        postcard::to_slice(&stored, buf).map_err(|_| StoreError::Encode)
    }

    /// Whether writes happened since the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume a pending flush request
    pub fn take_flush(&mut self) -> bool {
        let flush = core::mem::take(&mut self.flush);
        if flush {
            self.dirty = false;
        }
        flush
    }
}

impl PersistentStore for MirroredStore {
    fn read_field(&mut self, id: FieldId) -> i32 {
        self.values[id.index()]
    }

    fn write_field(&mut self, id: FieldId, value: i32) -> bool {
        let slot = &mut self.values[id.index()];
        if *slot == value {
            return false;
        }
        *slot = value;
        self.dirty = true;
        true
    }

    fn commit(&mut self) {
        if self.dirty {
            self.flush = true;
        }
    }
}
