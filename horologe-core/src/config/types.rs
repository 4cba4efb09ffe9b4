//! Configuration type definitions
//!
//! Every default below is the stock behavior of the appliance; `clock.toml`
//! only needs to list what differs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::capabilities::Capabilities;
use super::parse::ParseError;

/// Number of hold tiers (short, long, very long, super long)
pub const HOLD_TIERS: usize = 4;

/// Display hardware technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplayKind {
    /// Multiplexed nixie tubes behind BCD decoders
    #[default]
    Nixie,
    /// MAX7219 7-segment driver on SPI
    Max7219,
    /// HT16K33 7-segment backpack on I2C
    Ht16k33,
}

/// How control lines are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InputKind {
    /// One GPIO per control, active low
    #[default]
    Buttons,
    /// All controls on one analog resistor ladder
    Ladder,
}

/// Display policy and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub kind: DisplayKind,
    /// Digit positions (4 or 6)
    pub width: u8,
    /// Length of the acknowledgement blink
    pub blink_ms: u32,
    /// Half period of the full/dim square wave while a field is edited
    pub edit_blink_ms: u32,
    /// Milliseconds per unit of the stored fade duration setting
    pub fade_unit_ms: u32,
    /// Multiplexed backends: lit time per slice at full brightness
    pub slice_full_us: u16,
    /// Multiplexed backends: lit time per slice at dim brightness
    pub slice_dim_us: u16,
    /// Latched backends: brightness register at full brightness
    pub intensity_full: u8,
    /// Latched backends: brightness register at dim brightness
    pub intensity_dim: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            kind: DisplayKind::Nixie,
            width: 6,
            blink_ms: 500,
            edit_blink_ms: 500,
            fade_unit_ms: 10,
            slice_full_us: 5000,
            slice_dim_us: 50,
            intensity_full: 15,
            intensity_dim: 0,
        }
    }
}

/// Input classification timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    pub kind: InputKind,
    /// Quiet window after any accepted press, release or detent
    pub debounce_ms: u32,
    /// Hold thresholds, strictly increasing: short, long, very long, super long
    pub hold_ms: [u32; HOLD_TIERS],
    /// Auto-repeat interval from the short tier
    pub repeat_slow_ms: u32,
    /// Auto-repeat interval from the long tier
    pub repeat_fast_ms: u32,
    /// Detents closer together than this switch to high velocity
    pub rotary_fast_ms: u32,
    /// Detents further apart than this drop back to low velocity
    pub rotary_slow_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            kind: InputKind::Buttons,
            debounce_ms: 150,
            hold_ms: [1000, 3000, 5000, 10_000],
            repeat_slow_ms: 125,
            repeat_fast_ms: 20,
            rotary_fast_ms: 80,
            rotary_slow_ms: 500,
        }
    }
}

/// Navigation timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavConfig {
    /// Editing and settings menu give up after this much idle time
    pub settings_timeout_ms: u32,
    /// Temporary functions revert to time of day after this much idle time
    pub temp_timeout_ms: u32,
    /// Interval between auto-advancing pages
    pub page_timeout_ms: u32,
    /// How long an input lights a display that night mode turned off
    pub unoff_ms: u32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            settings_timeout_ms: 300_000,
            temp_timeout_ms: 5000,
            page_timeout_ms: 3000,
            unoff_ms: 10_000,
        }
    }
}

/// Complete clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub nav: NavConfig,
    pub capabilities: Capabilities,
}

impl ClockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check cross-field constraints the parser cannot see line by line
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.display.width != 4 && self.display.width != 6 {
            return Err(ParseError::OutOfRange);
        }
        if self.display.slice_dim_us > self.display.slice_full_us
            || self.display.intensity_dim > self.display.intensity_full
        {
            return Err(ParseError::Inconsistent);
        }
        if self.display.edit_blink_ms == 0 {
            return Err(ParseError::OutOfRange);
        }
        let hold = &self.input.hold_ms;
        if hold[0] == 0 || hold.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ParseError::Inconsistent);
        }
        if self.input.rotary_fast_ms >= self.input.rotary_slow_ms {
            return Err(ParseError::Inconsistent);
        }
        if self.input.repeat_fast_ms == 0 || self.input.repeat_fast_ms > self.input.repeat_slow_ms {
            return Err(ParseError::Inconsistent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(ClockConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_hold_thresholds_must_increase() {
        let mut config = ClockConfig::default();
        config.input.hold_ms = [1000, 3000, 3000, 10_000];
        assert_eq!(config.validate(), Err(ParseError::Inconsistent));
    }

    #[test]
    fn test_rotary_hysteresis_must_be_ordered() {
        let mut config = ClockConfig::default();
        config.input.rotary_fast_ms = 600;
        assert_eq!(config.validate(), Err(ParseError::Inconsistent));
    }

    #[test]
    fn test_width_limits() {
        let mut config = ClockConfig::default();
        config.display.width = 5;
        assert_eq!(config.validate(), Err(ParseError::OutOfRange));
    }
}
