//! HT16K33 7-segment backpack over I2C
//!
//! The common 4-digit backpack wires digits to display RAM rows 0, 1, 3
//! and 4 (row 2 drives the colon). Each row is two bytes of RAM.

use embedded_hal::i2c::I2c;
use horologe_core::traits::{BackendCaps, Digit, DisplayBackend, DisplayError, Drive};

/// Default 7-bit bus address (no address jumpers)
pub const DEFAULT_ADDRESS: u8 = 0x70;

const OSCILLATOR_ON: u8 = 0x21;
const DISPLAY_ON: u8 = 0x81;
const DISPLAY_OFF: u8 = 0x80;
const DIMMING: u8 = 0xE0;

/// Highest dimming level
pub const MAX_DIMMING: u8 = 0x0F;

/// RAM row per digit position
const ROWS: [usize; 4] = [0, 1, 3, 4];

/// Segments for 0-9, bit 0 = segment a
const FONT: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Segment pattern for a digit (blank lights nothing)
pub fn segments(digit: Digit) -> u8 {
    digit.value().map(|v| FONT[v as usize]).unwrap_or(0)
}

pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
    dim: u8,
    full: u8,
    initialized: bool,
}

impl<I2C: I2c> Ht16k33<I2C> {
    pub fn new(i2c: I2C, address: u8, dim: u8, full: u8) -> Self {
        let full = full.min(MAX_DIMMING);
        Self {
            i2c,
            address,
            dim: dim.min(full),
            full,
            initialized: false,
        }
    }

    fn command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[command])
            .map_err(|_| DisplayError::Communication)
    }

    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.command(OSCILLATOR_ON)?;
        self.command(DIMMING | self.full)?;
        self.command(DISPLAY_ON)?;
        self.initialized = true;
        Ok(())
    }
}

impl<I2C: I2c> DisplayBackend for Ht16k33<I2C> {
    fn caps(&self) -> BackendCaps {
        BackendCaps {
            width: ROWS.len() as u8,
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
            Drive::Dark => self.command(DISPLAY_OFF),
            Drive::Lit(level) => {
                self.command(DIMMING | level.min(MAX_DIMMING as u16) as u8)?;
                self.command(DISPLAY_ON)
            }
        }
    }

    fn latch(&mut self, digits: &[Digit]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        // Start address, then RAM rows 0-4 at two bytes each
        let mut buf = [0u8; 1 + 2 * 5];
        for (row, digit) in ROWS.iter().zip(digits) {
            buf[1 + 2 * row] = segments(*digit);
        }
        self.i2c
            .write(self.address, &buf)
            .map_err(|_| DisplayError::Communication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for MockI2c {
        type Error = Infallible;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_and_drive() {
        let mut display = Ht16k33::new(MockI2c::default(), DEFAULT_ADDRESS, 2, 15);
        display.init().unwrap();
        display.set_drive(Drive::Dark).unwrap();
        display.set_drive(Drive::Lit(2)).unwrap();
        let commands: Vec<u8> = display.i2c.writes.iter().map(|(_, b)| b[0]).collect();
        assert_eq!(commands, vec![0x21, 0xEF, 0x81, 0x80, 0xE2, 0x81]);
        assert!(display.i2c.writes.iter().all(|(a, _)| *a == 0x70));
    }

    #[test]
    fn test_latch_skips_colon_row() {
        let mut display = Ht16k33::new(MockI2c::default(), DEFAULT_ADDRESS, 0, 15);
        display.init().unwrap();
        display.i2c.writes.clear();
        let digits = [
            Digit::new(1).unwrap(),
            Digit::new(2).unwrap(),
            Digit::BLANK,
            Digit::new(8).unwrap(),
        ];
        display.latch(&digits).unwrap();
        let (_, bytes) = &display.i2c.writes[0];
        assert_eq!(
            bytes.as_slice(),
            &[0x00, 0x06, 0, 0x5B, 0, 0, 0, 0, 0, 0x7F, 0]
        );
    }

    #[test]
    fn test_caps() {
        let display = Ht16k33::new(MockI2c::default(), DEFAULT_ADDRESS, 20, 30);
        let caps = display.caps();
        assert_eq!(caps.width, 4);
        assert!(!caps.multiplexed);
        assert_eq!((caps.dim, caps.full), (15, 15));
    }
}
