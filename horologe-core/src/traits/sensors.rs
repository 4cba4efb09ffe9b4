//! Auxiliary data sources (temperature, sun, weather)
//!
//! These are computed or fetched outside the core. Every accessor returns
//! `None` when the data is unavailable, in which case the related page or
//! function shows blanks or is skipped.

use crate::time::DateTime;

/// Next sunrise or sunset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SunEvent {
    pub rising: bool,
    /// Minutes since midnight
    pub minutes: u16,
}

pub trait AuxSource {
    /// Ambient temperature in hundredths of a degree Celsius
    fn temperature_centi(&mut self) -> Option<i32> {
        None
    }

    /// Next sun event after `at`
    fn sun_event(&mut self, _at: &DateTime) -> Option<SunEvent> {
        None
    }

    /// Current outdoor temperature in whole degrees
    fn weather(&mut self) -> Option<i16> {
        None
    }
}

/// Aux source with nothing fitted
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAux;

impl AuxSource for NoAux {}
