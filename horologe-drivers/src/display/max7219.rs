//! MAX7219 7-segment driver over SPI
//!
//! Uses code-B decoding for every digit, so the core's blank sentinel (15)
//! maps straight onto the chip's blank code. Brightness is the 16-step
//! intensity register; dark is shutdown mode.

use embedded_hal::spi::SpiDevice;
use horologe_core::traits::{BackendCaps, Digit, DisplayBackend, DisplayError, Drive};

mod reg {
    pub const DIGIT0: u8 = 0x01;
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Highest intensity register value
pub const MAX_INTENSITY: u8 = 0x0F;

pub struct Max7219<SPI> {
    spi: SPI,
    width: u8,
    dim: u8,
    full: u8,
    initialized: bool,
}

impl<SPI: SpiDevice> Max7219<SPI> {
    /// `dim` and `full` are intensity register values (0-15)
    pub fn new(spi: SPI, width: u8, dim: u8, full: u8) -> Self {
        let full = full.min(MAX_INTENSITY);
        Self {
            spi,
            width: width.clamp(1, 8),
            dim: dim.min(full),
            full,
            initialized: false,
        }
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), DisplayError> {
        self.spi
            .write(&[register, value])
            .map_err(|_| DisplayError::Communication)
    }

    /// Leave test mode, enable decoding and the scan limit, switch on
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.write(reg::DISPLAY_TEST, 0)?;
        self.write(reg::DECODE_MODE, 0xFF)?;
        self.write(reg::SCAN_LIMIT, self.width - 1)?;
        self.write(reg::INTENSITY, self.full)?;
        self.write(reg::SHUTDOWN, 1)?;
        self.initialized = true;
        Ok(())
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> DisplayBackend for Max7219<SPI> {
    fn caps(&self) -> BackendCaps {
        BackendCaps {
            width: self.width,
            multiplexed: false,
            crossfade: false,
            slices: 1,
            dim: self.dim as u16,
            full: self.full as u16,
        }
    }

    fn set_drive(&mut self, drive: Drive) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        match drive {
            Drive::Dark => self.write(reg::SHUTDOWN, 0),
            Drive::Lit(level) => {
                self.write(reg::INTENSITY, level.min(MAX_INTENSITY as u16) as u8)?;
                self.write(reg::SHUTDOWN, 1)
            }
        }
    }

    fn latch(&mut self, digits: &[Digit]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        for (position, digit) in digits.iter().take(self.width as usize).enumerate() {
            self.write(reg::DIGIT0 + position as u8, digit.code())?;
        }
        Ok(())
    }
}
