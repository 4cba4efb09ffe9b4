//! Hardware abstraction traits
//!
//! These traits define the interface between the clock core and the
//! hardware-specific implementations in `horologe-drivers` and the firmware.

pub mod alert;
pub mod clock;
pub mod display;
pub mod input;
pub mod sensors;
pub mod store;

pub use alert::{AlertSignal, AlertSource};
pub use clock::TimeSource;
pub use display::{
    BackendCaps, Digit, DigitSink, DisplayBackend, DisplayError, Drive, SliceFrame, MAX_DIGITS,
};
pub use input::{Control, ControlSource, InputError};
pub use sensors::{AuxSource, NoAux, SunEvent};
pub use store::{reset_to_defaults, FieldId, Overflow, PersistentStore};
