//! Software calendar clock
//!
//! Counts milliseconds from the board's monotonic timer. Crystal error is
//! trimmed with a signed correction applied once per elapsed hour.

use horologe_core::time::{days_since_epoch, elapsed, DateTime, Millis};
use horologe_core::traits::TimeSource;

const MS_PER_HOUR: u32 = 3_600_000;
const MS_PER_DAY: u64 = 86_400_000;

pub struct SoftClock {
    /// Milliseconds since 2000-01-01 00:00:00
    epoch_ms: u64,
    /// Monotonic time of the last update
    last: Option<Millis>,
    /// Uncorrected milliseconds toward the next drift correction
    hour_ms: u32,
    /// Added to the count once per hour (negative for a fast crystal)
    drift_ms_per_hour: i32,
}

impl SoftClock {
    pub fn new(start: DateTime) -> Self {
        Self {
            epoch_ms: start.to_epoch_seconds() as u64 * 1000,
            last: None,
            hour_ms: 0,
            drift_ms_per_hour: 0,
        }
    }

    pub fn with_drift(mut self, drift_ms_per_hour: i32) -> Self {
        self.drift_ms_per_hour = drift_ms_per_hour;
        self
    }

    pub fn set_drift(&mut self, drift_ms_per_hour: i32) {
        self.drift_ms_per_hour = drift_ms_per_hour;
    }

    /// Advance to the monotonic time `now`
    ///
    /// The first call only records the reference point.
    pub fn update(&mut self, now: Millis) {
        let Some(last) = self.last.replace(now) else {
            return;
        };
        let delta = elapsed(now, last);
        self.epoch_ms += delta as u64;
        self.hour_ms += delta;
        while self.hour_ms >= MS_PER_HOUR {
            self.hour_ms -= MS_PER_HOUR;
            self.epoch_ms = self
                .epoch_ms
                .saturating_add_signed(self.drift_ms_per_hour as i64);
        }
    }

    fn seconds(&self) -> u32 {
        (self.epoch_ms / 1000).min(u32::MAX as u64) as u32
    }
}

impl TimeSource for SoftClock {
    fn snapshot(&mut self) -> DateTime {
        DateTime::from_epoch_seconds(self.seconds())
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
        let day_start = self.epoch_ms - self.epoch_ms % MS_PER_DAY;
        let time_ms = (hour as u64 * 3600 + minute as u64 * 60 + second as u64) * 1000;
        self.epoch_ms = day_start + time_ms;
        self.hour_ms = 0;
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) {
        let time_ms = self.epoch_ms % MS_PER_DAY;
        self.epoch_ms = days_since_epoch(year, month, day) as u64 * MS_PER_DAY + time_ms;
    }
}
