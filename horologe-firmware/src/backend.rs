//! Display backend selected by `clock.toml`

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use horologe_core::traits::{BackendCaps, Digit, DisplayBackend, DisplayError, Drive, SliceFrame};
use horologe_drivers::display::{Ht16k33, Max7219, NixieMultiplexer};

pub type NixieBackend = NixieMultiplexer<Output<'static>, Delay>;
pub type Max7219Backend =
    Max7219<ExclusiveDevice<Spi<'static, SPI0, spi::Blocking>, Output<'static>, Delay>>;
pub type Ht16k33Backend = Ht16k33<I2c<'static, I2C0, i2c::Blocking>>;

pub enum Backend {
    Nixie(NixieBackend),
    Max7219(Max7219Backend),
    Ht16k33(Ht16k33Backend),
}

impl DisplayBackend for Backend {
    fn caps(&self) -> BackendCaps {
        match self {
            Backend::Nixie(b) => b.caps(),
            Backend::Max7219(b) => b.caps(),
            Backend::Ht16k33(b) => b.caps(),
        }
    }

    fn set_drive(&mut self, drive: Drive) -> Result<(), DisplayError> {
        match self {
            Backend::Nixie(b) => b.set_drive(drive),
            Backend::Max7219(b) => b.set_drive(drive),
            Backend::Ht16k33(b) => b.set_drive(drive),
        }
    }

    fn latch(&mut self, digits: &[Digit]) -> Result<(), DisplayError> {
        match self {
            Backend::Nixie(b) => b.latch(digits),
            Backend::Max7219(b) => b.latch(digits),
            Backend::Ht16k33(b) => b.latch(digits),
        }
    }

    fn refresh_slice(&mut self, slice: u8, frame: &SliceFrame) -> Result<(), DisplayError> {
        match self {
            Backend::Nixie(b) => b.refresh_slice(slice, frame),
            Backend::Max7219(b) => b.refresh_slice(slice, frame),
            Backend::Ht16k33(b) => b.refresh_slice(slice, frame),
        }
    }
}
