//! Board-agnostic core logic for the clock firmware
//!
//! This crate contains the real-time core of the appliance, independent of
//! any particular display, control or timekeeping hardware:
//!
//! - Hardware abstraction traits (display backend, controls, clock, storage, alert)
//! - Display driver (brightness policy, crossfade, blink, multiplex slicing)
//! - Input classifier (debounce, hold tiers, auto-repeat, rotary detents)
//! - Navigation state machine (functions, editing, settings menu, timeouts)
//! - Configuration types and the `clock.toml` parser
//! - Calendar helpers and wraparound-safe timing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod input;
pub mod nav;
pub mod time;
pub mod traits;
