//! Alert outputs

pub mod pulse;

pub use pulse::{Pattern, PulseAlert};
