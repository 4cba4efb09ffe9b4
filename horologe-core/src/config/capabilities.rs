//! Hardware and feature capability descriptor
//!
//! Injected into the navigation state machine so which functions and
//! settings exist is decided once at construction instead of at every
//! transition.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::nav::ClockFunction;
use crate::traits::BackendCaps;

/// Set of enabled clock functions, indexed by [`ClockFunction::ordinal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionSet(u16);

impl FunctionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, function: ClockFunction) -> bool {
        match function.ordinal() {
            Some(bit) => self.0 & (1 << bit) != 0,
            None => false,
        }
    }

    pub fn insert(&mut self, function: ClockFunction) {
        if let Some(bit) = function.ordinal() {
            self.0 |= 1 << bit;
        }
    }

    pub fn remove(&mut self, function: ClockFunction) {
        if let Some(bit) = function.ordinal() {
            self.0 &= !(1 << bit);
        }
    }

    pub fn set(&mut self, function: ClockFunction, enabled: bool) {
        if enabled {
            self.insert(function);
        } else {
            self.remove(function);
        }
    }
}

impl Default for FunctionSet {
    fn default() -> Self {
        let mut set = Self::empty();
        for function in [
            ClockFunction::TimeOfDay,
            ClockFunction::Date,
            ClockFunction::Alarm,
            ClockFunction::Timer,
            ClockFunction::DayCounter,
        ] {
            set.insert(function);
        }
        set
    }
}

/// What this particular clock has fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Capabilities {
    /// Functions offered in the display rotation (time of day is always on)
    pub functions: FunctionSet,
    /// Alt preset control fitted
    pub has_alt: bool,
    /// Up/Down come from a rotary encoder instead of buttons
    pub has_rotary: bool,
    /// Buzzer or other alert output fitted
    pub has_signal: bool,
    /// Ambient light sensor fitted
    pub has_ambient: bool,
    /// Display backend can crossfade (filled in from the backend)
    pub crossfade: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            functions: FunctionSet::default(),
            has_alt: false,
            has_rotary: false,
            has_signal: true,
            has_ambient: false,
            crossfade: false,
        }
    }
}

impl Capabilities {
    /// Merge in what the display backend reports about itself
    pub fn with_backend(mut self, caps: &BackendCaps) -> Self {
        self.crossfade = caps.crossfade;
        self
    }

    /// Whether a function is available on this clock
    pub fn has(&self, function: ClockFunction) -> bool {
        match function {
            ClockFunction::TimeOfDay | ClockFunction::Version => true,
            ClockFunction::SettingsOption(_) => false,
            ClockFunction::Alarm => self.has_signal && self.functions.contains(function),
            other => self.functions.contains(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_set() {
        let mut set = FunctionSet::empty();
        assert!(!set.contains(ClockFunction::Timer));
        set.insert(ClockFunction::Timer);
        assert!(set.contains(ClockFunction::Timer));
        set.set(ClockFunction::Timer, false);
        assert!(!set.contains(ClockFunction::Timer));
    }

    #[test]
    fn test_alarm_requires_signal() {
        let mut caps = Capabilities::default();
        assert!(caps.has(ClockFunction::Alarm));
        caps.has_signal = false;
        assert!(!caps.has(ClockFunction::Alarm));
    }

    #[test]
    fn test_time_of_day_always_available() {
        let caps = Capabilities {
            functions: FunctionSet::empty(),
            ..Capabilities::default()
        };
        assert!(caps.has(ClockFunction::TimeOfDay));
        assert!(!caps.has(ClockFunction::Date));
    }
}
