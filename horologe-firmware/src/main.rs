//! Horologe - Digit Clock Firmware
//!
//! Main firmware binary for RP2040-based nixie and LED digit clocks.
//! Everything runs from one polling loop: read controls, advance
//! navigation, refresh the display, persist settings, yield.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::adc::{Adc, Channel};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::{i2c, spi};
use embassy_time::{Delay, Instant};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use horologe_core::config::{DisplayKind, InputKind};
use horologe_core::display::DisplayDriver;
use horologe_core::input::InputClassifier;
use horologe_core::nav::{Io, NavigationStateMachine};
use horologe_core::time::{DateTime, Millis};
use horologe_core::traits::{Control, DisplayBackend};
use horologe_drivers::clock::SoftClock;
use horologe_drivers::display::nixie::NixieTiming;
use horologe_drivers::display::{ht16k33, Ht16k33, Max7219, NixieMultiplexer};
use horologe_drivers::input::{AnalogLadder, ButtonBank};
use horologe_drivers::signal::PulseAlert;
use horologe_hal_rp2040::flash::Rp2040FlashStorage;

use crate::analog::{AdcInput, Controls, Sensors, SharedAdc};
use crate::backend::Backend;
use crate::tasks::SharedTransitions;

mod analog;
mod backend;
mod config;
mod tasks;

static ADC: StaticCell<SharedAdc> = StaticCell::new();

/// Monotonic milliseconds, wrapping like the core expects
fn now_ms() -> Millis {
    Instant::now().as_millis() as Millis
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Horologe firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let config = config::load_config(&mut storage).await;
    let mut store = config::load_settings(&mut storage).await;
    info!(
        "Config: display={:?}, input={:?}, width={}",
        config.display.kind, config.input.kind, config.display.width
    );

    // Display backend
    // Nixie: BCD GPIO2-9, anodes GPIO10-12. MAX7219: SPI0 CS17/SCK18/MOSI19.
    // HT16K33: I2C0 SDA20/SCL21.
    let display = &config.display;
    let backend = match display.kind {
        DisplayKind::Nixie => {
            let low = Level::Low;
            Backend::Nixie(NixieMultiplexer::new(
                [
                    Output::new(p.PIN_2, low),
                    Output::new(p.PIN_3, low),
                    Output::new(p.PIN_4, low),
                    Output::new(p.PIN_5, low),
                ],
                [
                    Output::new(p.PIN_6, low),
                    Output::new(p.PIN_7, low),
                    Output::new(p.PIN_8, low),
                    Output::new(p.PIN_9, low),
                ],
                [
                    Output::new(p.PIN_10, low),
                    Output::new(p.PIN_11, low),
                    Output::new(p.PIN_12, low),
                ],
                Delay,
                NixieTiming {
                    full_us: display.slice_full_us,
                    dim_us: display.slice_dim_us,
                },
            ))
        }
        DisplayKind::Max7219 => {
            let mut spi_config = spi::Config::default();
            spi_config.frequency = 1_000_000;
            let bus = spi::Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
            let cs = Output::new(p.PIN_17, Level::High);
            let device = match ExclusiveDevice::new(bus, cs, Delay) {
                Ok(device) => device,
                Err(e) => match e {},
            };
            let mut driver = Max7219::new(
                device,
                display.width,
                display.intensity_dim,
                display.intensity_full,
            );
            if let Err(e) = driver.init() {
                warn!("MAX7219 init failed: {:?}", e);
            }
            Backend::Max7219(driver)
        }
        DisplayKind::Ht16k33 => {
            let bus = i2c::I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, i2c::Config::default());
            let mut driver = Ht16k33::new(
                bus,
                ht16k33::DEFAULT_ADDRESS,
                display.intensity_dim,
                display.intensity_full,
            );
            if let Err(e) = driver.init() {
                warn!("HT16K33 init failed: {:?}", e);
            }
            Backend::Ht16k33(driver)
        }
    };
    let capabilities = config.capabilities.with_backend(&backend.caps());
    let config = horologe_core::config::ClockConfig {
        capabilities,
        ..config
    };
    let mut display = DisplayDriver::new(backend, &config.display);

    // Shared ADC: temperature always, ladder on GPIO28, ambient on GPIO27
    let adc = ADC.init(RefCell::new(Adc::new_blocking(p.ADC, Default::default())));
    let ambient = capabilities
        .has_ambient
        .then(|| Channel::new_pin(p.PIN_27, Pull::None));
    let mut sensors = Sensors::new(adc, Channel::new_temp_sensor(p.ADC_TEMP_SENSOR), ambient);

    // Controls: buttons on GPIO13-16 (Select, Alt, Up, Down), encoder on GPIO0/1
    if capabilities.has_rotary {
        let a = Input::new(p.PIN_0, Pull::Up);
        let b = Input::new(p.PIN_1, Pull::Up);
        match spawner.spawn(tasks::encoder_task(a, b)) {
            Ok(()) => info!("Rotary encoder enabled"),
            Err(_) => warn!("Failed to spawn encoder task"),
        }
    }
    let mut controls = match config.input.kind {
        InputKind::Buttons => {
            let mut bank = ButtonBank::new(Input::new(p.PIN_13, Pull::Up))
                .with(Control::Up, Input::new(p.PIN_15, Pull::Up))
                .with(Control::Down, Input::new(p.PIN_16, Pull::Up));
            if capabilities.has_alt {
                bank = bank.with(Control::Alt, Input::new(p.PIN_14, Pull::Up));
            }
            Controls::Buttons(bank.with_rotary(SharedTransitions))
        }
        InputKind::Ladder => {
            let channel = Channel::new_pin(p.PIN_28, Pull::None);
            Controls::Ladder(
                AnalogLadder::new(AdcInput::new(adc, channel)),
                SharedTransitions,
            )
        }
    };

    let mut alert = PulseAlert::new(Output::new(p.PIN_22, Level::Low));
    // No RTC fitted; the clock starts at the epoch until set
    let mut clock = SoftClock::new(DateTime::default());

    let start = now_ms();
    clock.update(start);
    let mut classifier = InputClassifier::new(&config.input);
    let mut nav = NavigationStateMachine::new(&config, start);
    let held = classifier.claim_held_at_boot(start, &mut controls);
    nav.boot(start, held);

    info!("Entering main loop");

    loop {
        let now = now_ms();
        clock.update(now);

        let mut io = Io {
            display: &mut display,
            clock: &mut clock,
            store: &mut store,
            alert: &mut alert,
            aux: &mut sensors,
        };
        classifier.poll(now, &mut controls, |event| nav.handle(now, event, &mut io));
        nav.tick(now, &mut io);

        let ambient = sensors.ambient();
        display.cycle(
            now,
            nav.brightness(),
            nav.ambient_enabled(),
            ambient,
            nav.editing_field_active(),
        );

        if alert.update(now).is_err() {
            warn!("Alert output write failed");
        }

        if store.take_flush() {
            if let Err(e) = config::save_settings(&mut storage, &store).await {
                warn!("Settings not persisted: {:?}", e);
            }
        }

        yield_now().await;
    }
}
