//! Settings persistence

pub mod mirror;

pub use mirror::{MirroredStore, StoreError, StoredSettings, MAX_BLOB_SIZE, STORE_VERSION};
