//! Controls on a single analog resistor ladder
//!
//! Each control pulls the ADC input to a different voltage. Only one
//! control can be read at a time, which matches the classifier's single
//! owner.

use horologe_core::traits::{Control, ControlSource, InputError};

/// ADC reading abstraction
pub trait AnalogRead {
    /// Read a 12-bit sample (0-4095)
    fn read(&mut self) -> Result<u16, InputError>;
}

/// Sample range that means a control is down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LadderBand {
    pub control: Control,
    /// Inclusive lower bound
    pub min: u16,
    /// Exclusive upper bound
    pub max: u16,
}

/// Bands for the stock ladder (3.3 V, 10k pull-up, 12-bit ADC)
///
/// Readings at or above 2900 mean nothing is pressed.
pub const DEFAULT_BANDS: [LadderBand; 4] = [
    LadderBand {
        control: Control::Select,
        min: 0,
        max: 300,
    },
    LadderBand {
        control: Control::Alt,
        min: 300,
        max: 1100,
    },
    LadderBand {
        control: Control::Up,
        min: 1100,
        max: 2000,
    },
    LadderBand {
        control: Control::Down,
        min: 2000,
        max: 2900,
    },
];

pub struct AnalogLadder<A> {
    adc: A,
    bands: [LadderBand; 4],
}

impl<A: AnalogRead> AnalogLadder<A> {
    pub fn new(adc: A) -> Self {
        Self::with_bands(adc, DEFAULT_BANDS)
    }

    pub fn with_bands(adc: A, bands: [LadderBand; 4]) -> Self {
        Self { adc, bands }
    }

    /// Control whose band contains `sample`
    pub fn classify(&self, sample: u16) -> Option<Control> {
        self.bands
            .iter()
            .find(|band| sample >= band.min && sample < band.max)
            .map(|band| band.control)
    }
}

impl<A: AnalogRead> ControlSource for AnalogLadder<A> {
    fn is_pressed(&mut self, control: Control) -> Result<bool, InputError> {
        let sample = self.adc.read()?;
        Ok(self.classify(sample) == Some(control))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAdc(Result<u16, InputError>);

    impl AnalogRead for MockAdc {
        fn read(&mut self) -> Result<u16, InputError> {
            self.0
        }
    }

    #[test]
    fn test_band_edges() {
        let ladder = AnalogLadder::new(MockAdc(Ok(0)));
        assert_eq!(ladder.classify(0), Some(Control::Select));
        assert_eq!(ladder.classify(299), Some(Control::Select));
        assert_eq!(ladder.classify(300), Some(Control::Alt));
        assert_eq!(ladder.classify(1500), Some(Control::Up));
        assert_eq!(ladder.classify(2899), Some(Control::Down));
        assert_eq!(ladder.classify(2900), None);
        assert_eq!(ladder.classify(4095), None);
    }

    #[test]
    fn test_only_one_control_reads_pressed() {
        let mut ladder = AnalogLadder::new(MockAdc(Ok(1500)));
        let pressed: Vec<Control> = Control::ALL
            .into_iter()
            .filter(|c| ladder.is_pressed(*c) == Ok(true))
            .collect();
        assert_eq!(pressed, vec![Control::Up]);
    }

    #[test]
    fn test_adc_failure_propagates() {
        let mut ladder = AnalogLadder::new(MockAdc(Err(InputError::ReadFailed)));
        assert_eq!(
            ladder.is_pressed(Control::Select),
            Err(InputError::ReadFailed)
        );
    }
}
