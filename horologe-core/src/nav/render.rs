//! Digit layouts for each function and setting
//!
//! Position 0 is the leftmost digit. Six-wide displays show seconds (or a
//! third date component); four-wide displays drop them.

use crate::time::DateTime;
use crate::traits::{DigitSink, FieldId};

/// Firmware version as `MMmmpp`
pub const VERSION: u32 = parse_decimal(env!("CARGO_PKG_VERSION_MAJOR")) * 10_000
    + parse_decimal(env!("CARGO_PKG_VERSION_MINOR")) * 100
    + parse_decimal(env!("CARGO_PKG_VERSION_PATCH"));

const fn parse_decimal(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// User formatting preferences read from the store once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub twelve_hour: bool,
    pub leading_zero: bool,
    pub date_format: i32,
}

fn last(width: u8) -> u8 {
    width.saturating_sub(1)
}

/// Time of day, `hhmmss` or `hhmm`
pub fn time_of_day(display: &mut dyn DigitSink, format: &Format, time: &DateTime, fade: bool) {
    let width = display.width();
    let hour = if format.twelve_hour {
        match time.hour % 12 {
            0 => 12,
            h => h,
        }
    } else {
        time.hour
    } as u32;
    let value = if width >= 6 {
        hour * 10_000 + time.minute as u32 * 100 + time.second as u32
    } else {
        hour * 100 + time.minute as u32
    };
    // Midnight in 24-hour mode keeps "00" rather than blanking the hour
    let leading = format.leading_zero || hour == 0;
    display.set_digits(value, 0, last(width), leading, fade);
}

/// Date in the configured component order; four-wide shows the first two
pub fn date(display: &mut dyn DigitSink, format: &Format, year: u16, month: u8, day: u8) {
    let width = display.width();
    let (year, month, day) = (year as u32 % 100, month as u32, day as u32);
    let [a, b, c] = match format.date_format {
        2 => [day, month, year],
        3 => [year, month, day],
        _ => [month, day, year],
    };
    if width >= 6 {
        display.set_digits(a * 10_000 + b * 100 + c, 0, last(width), true, true);
    } else if format.date_format == 3 {
        display.set_digits(b * 100 + c, 0, last(width), true, true);
    } else {
        display.set_digits(a * 100 + b, 0, last(width), true, true);
    }
}

/// Minutes since midnight as `hhmm` on the left four digits
pub fn clock_minutes(display: &mut dyn DigitSink, minutes: i32, fade: bool) {
    let minutes = minutes.clamp(0, 1439) as u32;
    display.set_digits(minutes / 60 * 100 + minutes % 60, 0, 3, true, fade);
    if display.width() > 4 {
        display.blank(4, last(display.width()), fade);
    }
}

/// Alarm time with its on flag in the last digit on six-wide displays
pub fn alarm(display: &mut dyn DigitSink, minutes: i32, on: bool) {
    let width = display.width();
    let minutes = minutes.clamp(0, 1439) as u32;
    let hhmm = minutes / 60 * 100 + minutes % 60;
    if width >= 6 {
        display.set_digits(hhmm * 100 + on as u32, 0, last(width), true, true);
    } else {
        display.set_digits(hhmm, 0, last(width), true, true);
    }
}

/// Whole seconds as `hhmmss`, or `mmss` (`hhmm` past an hour) on four digits
pub fn duration(display: &mut dyn DigitSink, seconds: u32, fade: bool) {
    let width = display.width();
    let (h, m, s) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    let value = if width >= 6 {
        h * 10_000 + m * 100 + s
    } else if h > 0 {
        h * 100 + m
    } else {
        m * 100 + s
    };
    display.set_digits(value, 0, last(width), true, fade);
}

/// A right-aligned number without leading zeros, or blanks when absent
pub fn number(display: &mut dyn DigitSink, value: Option<u32>) {
    let width = display.width();
    match value {
        Some(value) => display.set_digits(value, 0, last(width), false, true),
        None => display.blank(0, last(width), true),
    }
}

/// A signed reading; tubes have no minus, so a negative value keeps its
/// leading zeros and a positive one blanks them
pub fn signed(display: &mut dyn DigitSink, value: Option<i32>) {
    let width = display.width();
    match value {
        Some(value) => {
            display.set_digits(value.unsigned_abs(), 0, last(width), value < 0, true)
        }
        None => display.blank(0, last(width), true),
    }
}

/// The same digit in every position
pub fn sweep(display: &mut dyn DigitSink, digit: u8) {
    let width = display.width();
    let ones = (0..width).fold(0u32, |acc, _| acc * 10 + 1);
    display.set_digits(ones * (digit % 10) as u32, 0, last(width), true, false);
}

/// Settings option: 1-based number on the left, value on the right
pub fn setting(display: &mut dyn DigitSink, option: u8, id: FieldId, value: i32) {
    let width = display.width();
    display.set_digits(option as u32 + 1, 0, 1, false, false);
    let value = value.max(0) as u32;
    if id.is_time_of_day() {
        if width >= 6 {
            display.set_digits(value / 60 * 100 + value % 60, 2, 5, true, false);
        } else {
            display.set_digits(value / 60, 2, 3, true, false);
        }
    } else {
        display.set_digits(value, 2, last(width), false, false);
    }
}
