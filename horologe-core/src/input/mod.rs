//! Input classification
//!
//! Turns raw control levels and rotary transitions into press, hold-tier,
//! release and repeat events.

pub mod classifier;
pub mod event;
pub mod rotary;

pub use classifier::InputClassifier;
pub use event::{ControlEvent, Disposition, EventKind, HoldTier};
pub use rotary::{Detents, RotaryAccumulator};

pub use crate::traits::Control;
