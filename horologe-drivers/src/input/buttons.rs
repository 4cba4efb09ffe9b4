//! One GPIO per control
//!
//! Buttons pull their line to ground when pressed (active low). Alt is
//! optional, and Up/Down may be replaced by a rotary encoder feeding the
//! transition counter.

use embedded_hal::digital::InputPin;
use horologe_core::traits::{Control, ControlSource, InputError};

use super::quadrature::{NoRotary, TransitionCounter};

pub struct ButtonBank<P, R = NoRotary> {
    /// Indexed by [`Control::index`]
    pins: [Option<P>; 4],
    rotary: R,
    active_low: bool,
}

impl<P: InputPin> ButtonBank<P, NoRotary> {
    pub fn new(select: P) -> Self {
        Self {
            pins: [Some(select), None, None, None],
            rotary: NoRotary,
            active_low: true,
        }
    }
}

impl<P: InputPin, R: TransitionCounter> ButtonBank<P, R> {
    /// Fit a button for `control`
    pub fn with(mut self, control: Control, pin: P) -> Self {
        self.pins[control.index()] = Some(pin);
        self
    }

    /// Read a rotary encoder through `rotary`
    pub fn with_rotary<T: TransitionCounter>(self, rotary: T) -> ButtonBank<P, T> {
        ButtonBank {
            pins: self.pins,
            rotary,
            active_low: self.active_low,
        }
    }

    /// Buttons that pull the line high when pressed
    pub fn active_high(mut self) -> Self {
        self.active_low = false;
        self
    }

    pub fn has(&self, control: Control) -> bool {
        self.pins[control.index()].is_some()
    }
}

impl<P: InputPin, R: TransitionCounter> ControlSource for ButtonBank<P, R> {
    fn is_pressed(&mut self, control: Control) -> Result<bool, InputError> {
        let active_low = self.active_low;
        match self.pins[control.index()].as_mut() {
            None => Ok(false),
            Some(pin) if active_low => pin.is_low().map_err(|_| InputError::ReadFailed),
            Some(pin) => pin.is_high().map_err(|_| InputError::ReadFailed),
        }
    }

    fn take_transitions(&mut self) -> i32 {
        self.rotary.take()
    }
}
