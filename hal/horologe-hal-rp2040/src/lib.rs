//! RP2040 implementations of the `horologe-hal` traits

#![no_std]

pub mod flash;

pub use horologe_hal::{FlashStorage as FlashStorageTrait, StorageKey};
