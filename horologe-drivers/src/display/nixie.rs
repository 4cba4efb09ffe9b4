//! Multiplexed nixie tubes
//!
//! Six tubes behind two BCD-to-decimal decoders (74141 or K155ID1) and
//! three anode switches. Decoder A feeds tubes 0-2, decoder B tubes 3-5;
//! anode `n` lights tubes `n` and `n + 3` together, so one refresh is three
//! slices.
//!
//! Within a slice the outgoing digits are lit first, then the incoming
//! digits, then the anodes stay dark for the rest of the slice. Brightness
//! and crossfade are both just a split of that time.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use horologe_core::traits::{
    BackendCaps, Digit, DisplayBackend, DisplayError, Drive, SliceFrame,
};

/// Tubes lit per slice
const TUBES_PER_SLICE: usize = 2;

/// Number of anode groups
pub const SLICES: u8 = 3;

/// Slice timing, microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NixieTiming {
    /// Lit time at full brightness (also the slice length)
    pub full_us: u16,
    /// Lit time at the dimmest setting
    pub dim_us: u16,
}

impl Default for NixieTiming {
    fn default() -> Self {
        Self {
            full_us: 5000,
            dim_us: 50,
        }
    }
}

pub struct NixieMultiplexer<P, D> {
    bcd_a: [P; 4],
    bcd_b: [P; 4],
    anodes: [P; SLICES as usize],
    delay: D,
    timing: NixieTiming,
    dark: bool,
}

impl<P: OutputPin, D: DelayNs> NixieMultiplexer<P, D> {
    /// Decoder inputs are ordered A (LSB) to D (MSB)
    pub fn new(
        bcd_a: [P; 4],
        bcd_b: [P; 4],
        anodes: [P; SLICES as usize],
        delay: D,
        timing: NixieTiming,
    ) -> Self {
        Self {
            bcd_a,
            bcd_b,
            anodes,
            delay,
            timing,
            dark: true,
        }
    }

    /// Positions lit by a slice
    pub fn slice_positions(slice: u8) -> [usize; TUBES_PER_SLICE] {
        let slice = slice as usize;
        [slice, slice + SLICES as usize]
    }

    fn write_bcd(pins: &mut [P; 4], digit: Digit) -> Result<(), DisplayError> {
        let code = digit.code();
        for (bit, pin) in pins.iter_mut().enumerate() {
            let level = PinState::from(code & (1 << bit) != 0);
            pin.set_state(level).map_err(|_| DisplayError::Communication)?;
        }
        Ok(())
    }

    fn show(&mut self, digits: &[Digit], slice: u8) -> Result<(), DisplayError> {
        let [a, b] = Self::slice_positions(slice);
        let blank = Digit::BLANK;
        Self::write_bcd(&mut self.bcd_a, *digits.get(a).unwrap_or(&blank))?;
        Self::write_bcd(&mut self.bcd_b, *digits.get(b).unwrap_or(&blank))
    }

    fn anodes_off(&mut self) -> Result<(), DisplayError> {
        for anode in self.anodes.iter_mut() {
            anode.set_low().map_err(|_| DisplayError::Communication)?;
        }
        Ok(())
    }

    fn anode(&mut self, slice: u8, on: bool) -> Result<(), DisplayError> {
        let pin = self
            .anodes
            .get_mut(slice as usize)
            .ok_or(DisplayError::InvalidSlice)?;
        pin.set_state(PinState::from(on))
            .map_err(|_| DisplayError::Communication)
    }
}

impl<P: OutputPin, D: DelayNs> DisplayBackend for NixieMultiplexer<P, D> {
    fn caps(&self) -> BackendCaps {
        BackendCaps {
            width: 6,
            multiplexed: true,
            crossfade: true,
            slices: SLICES,
            dim: self.timing.dim_us,
            full: self.timing.full_us,
        }
    }

    fn set_drive(&mut self, drive: Drive) -> Result<(), DisplayError> {
        self.dark = drive == Drive::Dark;
        if self.dark {
            self.anodes_off()?;
        }
        Ok(())
    }

    fn latch(&mut self, _digits: &[Digit]) -> Result<(), DisplayError> {
        Ok(())
    }

    fn refresh_slice(&mut self, slice: u8, frame: &SliceFrame) -> Result<(), DisplayError> {
        if slice >= SLICES {
            return Err(DisplayError::InvalidSlice);
        }
        let lit_us = frame.outgoing_us as u32 + frame.incoming_us as u32;
        if self.dark || lit_us == 0 {
            return self.anodes_off();
        }

        if frame.outgoing_us > 0 {
            self.show(&frame.outgoing, slice)?;
            self.anode(slice, true)?;
            self.delay.delay_us(frame.outgoing_us as u32);
        }
        if frame.incoming_us > 0 {
            self.show(&frame.incoming, slice)?;
            self.anode(slice, true)?;
            self.delay.delay_us(frame.incoming_us as u32);
        }
        self.anode(slice, false)?;

        let rest = (self.timing.full_us as u32).saturating_sub(lit_us);
        if rest > 0 {
            self.delay.delay_us(rest);
        }
        Ok(())
    }
}
