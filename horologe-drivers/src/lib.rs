//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in horologe-core, written
//! against `embedded-hal` 1.0 so any chip HAL can supply the pins and buses:
//!
//! - Display backends (multiplexed nixie, MAX7219, HT16K33)
//! - Control sources (GPIO buttons, analog ladder, quadrature decoder)
//! - Software clock
//! - RAM-mirrored settings store
//! - Pulsed alert output

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod display;
pub mod input;
pub mod signal;
pub mod store;
