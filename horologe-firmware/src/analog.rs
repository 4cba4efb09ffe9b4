//! ADC consumers: control ladder, ambient light and die temperature
//!
//! The ADC is shared through a `RefCell`; every user runs on the main loop
//! so a conflicting borrow is reported as a failed read.

use core::cell::RefCell;

use embassy_rp::adc::{self, Adc, Channel};

use horologe_core::traits::{AuxSource, Control, ControlSource, InputError};
use horologe_drivers::input::{AnalogLadder, AnalogRead, ButtonBank, TransitionCounter};

use crate::tasks::SharedTransitions;

pub type SharedAdc = RefCell<Adc<'static, adc::Blocking>>;

fn read(adc: &SharedAdc, channel: &mut Channel<'static>) -> Result<u16, InputError> {
    let mut adc = adc.try_borrow_mut().map_err(|_| InputError::ReadFailed)?;
    adc.blocking_read(channel).map_err(|_| InputError::ReadFailed)
}

/// One ADC channel read as a control ladder
pub struct AdcInput {
    adc: &'static SharedAdc,
    channel: Channel<'static>,
}

impl AdcInput {
    pub fn new(adc: &'static SharedAdc, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogRead for AdcInput {
    fn read(&mut self) -> Result<u16, InputError> {
        read(self.adc, &mut self.channel)
    }
}

/// Control hardware selected by `clock.toml`
pub enum Controls {
    Buttons(ButtonBank<embassy_rp::gpio::Input<'static>, SharedTransitions>),
    Ladder(AnalogLadder<AdcInput>, SharedTransitions),
}

impl ControlSource for Controls {
    fn is_pressed(&mut self, control: Control) -> Result<bool, InputError> {
        match self {
            Controls::Buttons(bank) => bank.is_pressed(control),
            Controls::Ladder(ladder, _) => ladder.is_pressed(control),
        }
    }

    fn take_transitions(&mut self) -> i32 {
        match self {
            Controls::Buttons(bank) => bank.take_transitions(),
            Controls::Ladder(_, rotary) => rotary.take(),
        }
    }
}

/// On-board sensors offered to navigation
pub struct Sensors {
    adc: &'static SharedAdc,
    temperature: Channel<'static>,
    ambient: Option<Channel<'static>>,
}

impl Sensors {
    pub fn new(
        adc: &'static SharedAdc,
        temperature: Channel<'static>,
        ambient: Option<Channel<'static>>,
    ) -> Self {
        Self {
            adc,
            temperature,
            ambient,
        }
    }

    /// Ambient light scaled to 0-255; full brightness without a sensor
    pub fn ambient(&mut self) -> u8 {
        let Some(channel) = self.ambient.as_mut() else {
            return u8::MAX;
        };
        match read(self.adc, channel) {
            Ok(raw) => (raw >> 4).min(255) as u8,
            Err(_) => u8::MAX,
        }
    }
}

impl AuxSource for Sensors {
    /// RP2040 die sensor: 0.706 V at 27 °C, -1.721 mV/°C
    fn temperature_centi(&mut self) -> Option<i32> {
        let raw = read(self.adc, &mut self.temperature).ok()? as i64;
        let microvolts = raw * 3_300_000 / 4096;
        Some((2700 - (microvolts - 706_000) * 100 / 1721) as i32)
    }
}
