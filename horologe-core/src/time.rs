//! Timestamps and calendar helpers
//!
//! All timestamps in the core are `u32` milliseconds from a free-running
//! counter that wraps roughly every 49.7 days. Durations are always computed
//! with wrapping subtraction so comparisons stay correct across a wrap.

/// Millisecond timestamp from a wrapping counter
pub type Millis = u32;

/// Minutes in a day
pub const MINUTES_PER_DAY: u16 = 1440;

/// First year representable by the epoch helpers
pub const EPOCH_YEAR: u16 = 2000;

/// Milliseconds elapsed from `since` to `now`, correct across a counter wrap
#[inline]
pub fn elapsed(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Whether at least `duration` ms have passed between `since` and `now`
#[inline]
pub fn has_elapsed(now: Millis, since: Millis, duration: u32) -> bool {
    elapsed(now, since) >= duration
}

/// A calendar date and time of day, as read from a time source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Default for DateTime {
    fn default() -> Self {
        Self {
            year: EPOCH_YEAR,
            month: 1,
            day: 1,
            weekday: day_of_week(EPOCH_YEAR, 1, 1),
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl DateTime {
    /// Build a date-time, deriving the weekday from the date
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            weekday: day_of_week(year, month, day),
            hour,
            minute,
            second,
        }
    }

    /// Minutes since midnight
    pub fn minutes_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Seconds since 2000-01-01 00:00:00
    pub fn to_epoch_seconds(&self) -> u32 {
        let days = days_since_epoch(self.year, self.month, self.day);
        days * 86_400 + self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    /// Inverse of [`DateTime::to_epoch_seconds`]
    pub fn from_epoch_seconds(seconds: u32) -> Self {
        let mut days = seconds / 86_400;
        let rem = seconds % 86_400;

        let mut year = EPOCH_YEAR;
        loop {
            let len = days_in_year(year) as u32;
            if days < len {
                break;
            }
            days -= len;
            year += 1;
        }

        let mut month = 1;
        loop {
            let len = days_in_month(year, month) as u32;
            if days < len {
                break;
            }
            days -= len;
            month += 1;
        }

        Self::new(
            year,
            month,
            days as u8 + 1,
            (rem / 3600) as u8,
            (rem / 60 % 60) as u8,
            (rem % 60) as u8,
        )
    }
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Days in `month` (1-12); out-of-range months report 31
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// 1-based ordinal day within the year
pub fn day_of_year(year: u16, month: u8, day: u8) -> u16 {
    let mut total = day as u16;
    for m in 1..month.min(13) {
        total += days_in_month(year, m) as u16;
    }
    total
}

/// Day of week, 0 = Sunday (Sakamoto's method)
pub fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let month = month.clamp(1, 12);
    let y = if month < 3 { year - 1 } else { year };
    ((y + y / 4 - y / 100 + y / 400 + OFFSETS[month as usize - 1] + day as u16) % 7) as u8
}

/// Whole days from 2000-01-01 to the given date
pub fn days_since_epoch(year: u16, month: u8, day: u8) -> u32 {
    let mut days = 0u32;
    for y in EPOCH_YEAR..year {
        days += days_in_year(y) as u32;
    }
    days + day_of_year(year, month, day) as u32 - 1
}

/// Days from `today` until the next occurrence of `month`/`day`
///
/// Zero on the day itself. A 29 February target falls on 28 February in a
/// non-leap year.
pub fn days_until(today: &DateTime, month: u8, day: u8) -> u16 {
    let now = day_of_year(today.year, today.month, today.day);
    let this_year = day.min(days_in_month(today.year, month));
    let target = day_of_year(today.year, month, this_year);
    if target >= now {
        target - now
    } else {
        let next = today.year + 1;
        let next_day = day.min(days_in_month(next, month));
        days_in_year(today.year) - now + day_of_year(next, month, next_day)
    }
}

/// Whether minute-of-day `test` falls in `[start, end)`, wrapping past midnight
///
/// An empty range (`start == end`) never matches.
pub fn is_time_in_range(start: u16, end: u16, test: u16) -> bool {
    if start <= end {
        test >= start && test < end
    } else {
        test >= start || test < end
    }
}
