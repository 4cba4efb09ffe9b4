//! Display backend and digit sink traits

/// Maximum number of digit positions any backend drives
pub const MAX_DIGITS: usize = 6;

/// One digit slot: a decimal digit 0-9 or blank
///
/// The blank sentinel is 15, which BCD-to-decimal nixie drivers and
/// MAX7219 code-B decoding both render as an unlit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    pub const BLANK: Digit = Digit(15);
    pub const ZERO: Digit = Digit(0);

    /// Create a digit, rejecting anything outside 0-9
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Digit(value))
        } else {
            None
        }
    }

    /// The low decimal digit of `value`
    pub const fn from_low(value: u32) -> Self {
        Digit((value % 10) as u8)
    }

    /// Decimal value, or `None` when blank
    pub fn value(self) -> Option<u8> {
        if self.is_blank() {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn is_blank(self) -> bool {
        self.0 == Self::BLANK.0
    }

    /// Raw code as sent to BCD hardware (0-9, or 15 for blank)
    pub fn code(self) -> u8 {
        self.0
    }
}

impl Default for Digit {
    fn default() -> Self {
        Digit::BLANK
    }
}

/// Errors reported by display hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus or pin write failed
    Communication,
    /// Backend used before initialization
    NotInitialized,
    /// Slice index outside the backend's multiplex cycle
    InvalidSlice,
}

/// Physical intensity command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Display fully dark
    Dark,
    /// Lit at a backend-specific intensity within `BackendCaps::dim..=full`
    ///
    /// Multiplexed backends interpret this as lit microseconds per slice;
    /// latched backends as a hardware brightness register value.
    Lit(u16),
}

/// Static description of what a backend can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BackendCaps {
    /// Number of digit positions (4 or 6)
    pub width: u8,
    /// Refreshed slice by slice from `cycle()` rather than latched
    pub multiplexed: bool,
    /// Supports crossfading between outgoing and incoming digits
    pub crossfade: bool,
    /// Slices per full refresh (1 for latched backends)
    pub slices: u8,
    /// Lowest lit intensity
    pub dim: u16,
    /// Highest intensity
    pub full: u16,
}

/// One multiplex slice worth of refresh data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceFrame {
    /// Digits shown before the current crossfade
    pub outgoing: [Digit; MAX_DIGITS],
    /// Digits being faded in (equal to `outgoing` when no fade runs)
    pub incoming: [Digit; MAX_DIGITS],
    /// Time the outgoing digits stay lit, in microseconds
    pub outgoing_us: u16,
    /// Time the incoming digits stay lit, in microseconds
    pub incoming_us: u16,
}

/// Trait implemented once per physical display technology
///
/// Shared policy (brightness, blink, crossfade, slice scheduling) lives in
/// [`crate::display::DisplayDriver`]; backends only move bits.
pub trait DisplayBackend {
    /// Describe the backend
    fn caps(&self) -> BackendCaps;

    /// Apply an intensity command
    ///
    /// Called only when the command changes.
    fn set_drive(&mut self, drive: Drive) -> Result<(), DisplayError>;

    /// Push a full set of digits to latched hardware
    fn latch(&mut self, digits: &[Digit]) -> Result<(), DisplayError>;

    /// Light one multiplex slice
    ///
    /// Implementations may busy-wait for at most the slice duration
    /// (`outgoing_us + incoming_us` plus the dark remainder of the slice).
    fn refresh_slice(&mut self, _slice: u8, _frame: &SliceFrame) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Digit output as seen by navigation
///
/// Implemented by [`crate::display::DisplayDriver`] and by test doubles.
pub trait DigitSink {
    /// Number of positions available
    fn width(&self) -> u8;

    /// Show `value` in positions `start..=end`, least significant digit at `end`
    fn set_digits(&mut self, value: u32, start: u8, end: u8, leading_zeros: bool, fade: bool);

    /// Blank positions `start..=end`
    fn blank(&mut self, start: u8, end: u8, fade: bool);

    /// Blank everything briefly as an acknowledgement cue
    fn display_blink(&mut self);

    /// Crossfade duration applied to faded updates (0 disables fading)
    fn set_fade_duration(&mut self, ms: u32);
}
