//! Buzzer or relay driven by a single output pin
//!
//! `AlertSignal` calls carry no timestamp, so a start or beep is latched
//! and its pattern is anchored at the next [`PulseAlert::update`].

use embedded_hal::digital::{OutputPin, PinState};
use horologe_core::time::{elapsed, Millis};
use horologe_core::traits::{AlertSignal, AlertSource};

/// On/off cadence with an automatic stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pattern {
    pub on_ms: u32,
    pub off_ms: u32,
    /// Stop after this long; 0 sounds until stopped
    pub timeout_ms: u32,
}

impl Pattern {
    pub const ALARM: Pattern = Pattern {
        on_ms: 500,
        off_ms: 500,
        timeout_ms: 60_000,
    };

    pub const TIMER: Pattern = Pattern {
        on_ms: 100,
        off_ms: 150,
        timeout_ms: 10_000,
    };

    fn level(&self, since: u32) -> bool {
        let period = self.on_ms + self.off_ms;
        period == 0 || since % period < self.on_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Idle,
    Alert { source: AlertSource, at: Option<Millis> },
    Beep { at: Option<Millis> },
}

pub struct PulseAlert<P> {
    pin: P,
    active_high: bool,
    alarm: Pattern,
    timer: Pattern,
    beep_ms: u32,
    output: Output,
}

impl<P: OutputPin> PulseAlert<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
            alarm: Pattern::ALARM,
            timer: Pattern::TIMER,
            beep_ms: 40,
            output: Output::Idle,
        }
    }

    pub fn active_low(mut self) -> Self {
        self.active_high = false;
        self
    }

    pub fn with_pattern(mut self, source: AlertSource, pattern: Pattern) -> Self {
        match source {
            AlertSource::Alarm => self.alarm = pattern,
            AlertSource::Timer => self.timer = pattern,
        }
        self
    }

    fn pattern(&self, source: AlertSource) -> Pattern {
        match source {
            AlertSource::Alarm => self.alarm,
            AlertSource::Timer => self.timer,
        }
    }

    /// Drive the pin for time `now`
    pub fn update(&mut self, now: Millis) -> Result<(), P::Error> {
        let on = match self.output {
            Output::Idle => false,
            Output::Alert { source, at } => {
                let at = at.unwrap_or(now);
                self.output = Output::Alert {
                    source,
                    at: Some(at),
                };
                let pattern = self.pattern(source);
                let since = elapsed(now, at);
                if pattern.timeout_ms > 0 && since >= pattern.timeout_ms {
                    self.output = Output::Idle;
                    false
                } else {
                    pattern.level(since)
                }
            }
            Output::Beep { at } => {
                let at = at.unwrap_or(now);
                if elapsed(now, at) >= self.beep_ms {
                    self.output = Output::Idle;
                    false
                } else {
                    self.output = Output::Beep { at: Some(at) };
                    true
                }
            }
        };
        self.pin.set_state(PinState::from(on == self.active_high))
    }
}

impl<P: OutputPin> AlertSignal for PulseAlert<P> {
    fn is_sounding(&self) -> bool {
        matches!(self.output, Output::Alert { .. })
    }

    fn source(&self) -> Option<AlertSource> {
        match self.output {
            Output::Alert { source, .. } => Some(source),
            _ => None,
        }
    }

    fn start(&mut self, source: AlertSource) {
        self.output = Output::Alert { source, at: None };
    }

    fn stop(&mut self) {
        self.output = Output::Idle;
    }

    fn beep(&mut self) {
        // A beep never interrupts a sounding alert
        if !self.is_sounding() {
            self.output = Output::Beep { at: None };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    fn level(alert: &mut PulseAlert<MockPin>, now: Millis) -> bool {
        alert.update(now).unwrap();
        alert.pin.high
    }

    #[test]
    fn test_alarm_pattern_and_timeout() {
        let mut alert = PulseAlert::new(MockPin { high: false });
        assert!(!level(&mut alert, 0));

        alert.start(AlertSource::Alarm);
        assert!(alert.is_sounding());
        assert_eq!(alert.source(), Some(AlertSource::Alarm));
        assert!(level(&mut alert, 1000));
        assert!(level(&mut alert, 1499));
        assert!(!level(&mut alert, 1500));
        assert!(level(&mut alert, 2000));

        assert!(!level(&mut alert, 61_000));
        assert!(!alert.is_sounding());
    }

    #[test]
    fn test_stop_releases_pin() {
        let mut alert = PulseAlert::new(MockPin { high: false });
        alert.start(AlertSource::Timer);
        assert!(level(&mut alert, 0));
        alert.stop();
        assert!(!level(&mut alert, 50));
        assert_eq!(alert.source(), None);
    }

    #[test]
    fn test_beep_is_short() {
        let mut alert = PulseAlert::new(MockPin { high: false });
        alert.beep();
        assert!(!alert.is_sounding());
        assert!(level(&mut alert, 10));
        assert!(level(&mut alert, 49));
        assert!(!level(&mut alert, 50));
    }

    #[test]
    fn test_active_low_output() {
        let mut alert = PulseAlert::new(MockPin { high: true }).active_low();
        assert!(level(&mut alert, 0));
        alert.start(AlertSource::Alarm);
        assert!(!level(&mut alert, 10));
    }

    #[test]
    fn test_custom_pattern_without_timeout() {
        let pattern = Pattern {
            on_ms: 10,
            off_ms: 0,
            timeout_ms: 0,
        };
        let mut alert =
            PulseAlert::new(MockPin { high: false }).with_pattern(AlertSource::Timer, pattern);
        alert.start(AlertSource::Timer);
        assert!(level(&mut alert, 0));
        assert!(level(&mut alert, 1_000_000));
        assert!(alert.is_sounding());
    }
}
