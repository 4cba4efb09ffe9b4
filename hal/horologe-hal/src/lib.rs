//! Horologe Hardware Abstraction Layer
//!
//! Chip-agnostic traits the firmware needs beyond `embedded-hal`. Display,
//! input and alert hardware is covered by `embedded-hal` directly; only
//! persistent storage has no standard async interface.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  horologe-firmware           │
//! └──────────────────────────────┘
//!               │
//!               ▼
//! ┌──────────────────────────────┐
//! │  horologe-hal (this crate)   │
//! └──────────────────────────────┘
//!               │
//!               ▼
//! ┌──────────────────────────────┐
//! │  horologe-hal-rp2040         │
//! └──────────────────────────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
