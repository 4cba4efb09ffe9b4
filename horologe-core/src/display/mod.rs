//! Display driver
//!
//! Backend-independent display policy: the digit buffer, brightness
//! resolution, acknowledgement blink and crossfade. Backends only implement
//! [`crate::traits::DisplayBackend`].

pub mod brightness;
pub mod driver;
pub mod fade;
pub mod frame;

pub use brightness::{BrightnessLevel, BrightnessPolicy};
pub use driver::DisplayDriver;
pub use fade::Crossfade;
pub use frame::{write_value, DisplayFrame};
