//! Control sources

pub mod buttons;
pub mod ladder;
pub mod quadrature;

pub use buttons::ButtonBank;
pub use ladder::{AnalogLadder, AnalogRead, LadderBand};
pub use quadrature::{NoRotary, QuadratureDecoder, TransitionCounter};
