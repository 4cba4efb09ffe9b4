//! Time sources

pub mod soft;

pub use soft::SoftClock;
