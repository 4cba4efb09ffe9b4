//! Time source trait

use crate::time::DateTime;

/// Wall-clock backend (hardware RTC or software clock)
pub trait TimeSource {
    /// Read the current date and time
    fn snapshot(&mut self) -> DateTime;

    /// Set the time of day
    fn set_time(&mut self, hour: u8, minute: u8, second: u8);

    /// Set the calendar date
    fn set_date(&mut self, year: u16, month: u8, day: u8);
}
