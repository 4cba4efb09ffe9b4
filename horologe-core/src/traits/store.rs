//! Persistent settings table

/// Identifiers of the persisted numeric settings
///
/// The discriminant is the slot index in the stored table; new fields are
/// appended so existing blobs keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FieldId {
    /// Alarm time, minutes since midnight
    AlarmTime = 0,
    /// 0 = off, 1 = on
    AlarmOn = 1,
    /// 0 = every day, 1 = weekdays only, 2 = weekends only
    AlarmDays = 2,
    /// Snooze length in minutes; 0 disables snooze
    SnoozeMinutes = 3,
    /// 1 = 12-hour, 2 = 24-hour
    HourFormat = 4,
    /// 0 = blank leading hour zero, 1 = show it
    LeadingZero = 5,
    /// 1 = month-day-year, 2 = day-month-year, 3 = year-month-day
    DateFormat = 6,
    /// Crossfade length in units of 10 ms; 0 disables fading
    FadeDuration = 7,
    /// 0 = none, 1 = dim at night, 2 = dark at night
    NightMode = 8,
    /// Night start, minutes since midnight
    NightStart = 9,
    /// Night end, minutes since midnight
    NightEnd = 10,
    /// Function ordinal jumped to by the Alt control
    AltPreset = 11,
    /// Countdown length in seconds; 0 makes the timer a chronograph
    TimerDuration = 12,
    /// 0 = stop, 1 = repeat, 2 = continue as chronograph
    TimerRunout = 13,
    /// Day counter target month
    DayCounterMonth = 14,
    /// Day counter target day
    DayCounterDay = 15,
    /// 0 = fixed brightness, 1 = follow ambient light
    AutoDim = 16,
}

/// How an adjustment past a field boundary behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overflow {
    /// Clamp at the boundary
    Saturate,
    /// Continue from the opposite boundary
    Wrap,
}

impl FieldId {
    pub const COUNT: usize = 17;

    pub const ALL: [FieldId; Self::COUNT] = [
        FieldId::AlarmTime,
        FieldId::AlarmOn,
        FieldId::AlarmDays,
        FieldId::SnoozeMinutes,
        FieldId::HourFormat,
        FieldId::LeadingZero,
        FieldId::DateFormat,
        FieldId::FadeDuration,
        FieldId::NightMode,
        FieldId::NightStart,
        FieldId::NightEnd,
        FieldId::AltPreset,
        FieldId::TimerDuration,
        FieldId::TimerRunout,
        FieldId::DayCounterMonth,
        FieldId::DayCounterDay,
        FieldId::AutoDim,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Factory value
    pub fn default_value(self) -> i32 {
        match self {
            FieldId::AlarmTime => 7 * 60,
            FieldId::AlarmOn => 0,
            FieldId::AlarmDays => 0,
            FieldId::SnoozeMinutes => 9,
            FieldId::HourFormat => 2,
            FieldId::LeadingZero => 0,
            FieldId::DateFormat => 1,
            FieldId::FadeDuration => 5,
            FieldId::NightMode => 0,
            FieldId::NightStart => 22 * 60,
            FieldId::NightEnd => 7 * 60,
            FieldId::AltPreset => 0,
            FieldId::TimerDuration => 0,
            FieldId::TimerRunout => 0,
            FieldId::DayCounterMonth => 12,
            FieldId::DayCounterDay => 25,
            FieldId::AutoDim => 0,
        }
    }

    /// Inclusive valid range
    pub fn range(self) -> (i32, i32) {
        match self {
            FieldId::AlarmTime | FieldId::NightStart | FieldId::NightEnd => (0, 1439),
            FieldId::AlarmOn | FieldId::LeadingZero | FieldId::AutoDim => (0, 1),
            FieldId::AlarmDays | FieldId::NightMode | FieldId::TimerRunout => (0, 2),
            FieldId::SnoozeMinutes => (0, 60),
            FieldId::HourFormat => (1, 2),
            FieldId::DateFormat => (1, 3),
            FieldId::FadeDuration => (0, 20),
            FieldId::AltPreset => (0, 5),
            FieldId::TimerDuration => (0, 86_399),
            FieldId::DayCounterMonth => (1, 12),
            FieldId::DayCounterDay => (1, 31),
        }
    }

    /// Step applied by one adjustment in the settings menu
    pub fn step(self) -> i32 {
        match self {
            FieldId::NightStart | FieldId::NightEnd => 15,
            _ => 1,
        }
    }

    pub fn overflow(self) -> Overflow {
        match self {
            FieldId::AlarmTime
            | FieldId::NightStart
            | FieldId::NightEnd
            | FieldId::AlarmOn
            | FieldId::LeadingZero
            | FieldId::AutoDim
            | FieldId::AlarmDays
            | FieldId::NightMode
            | FieldId::TimerRunout => Overflow::Wrap,
            _ => Overflow::Saturate,
        }
    }

    /// Whether the value is a minutes-since-midnight time
    pub fn is_time_of_day(self) -> bool {
        matches!(
            self,
            FieldId::AlarmTime | FieldId::NightStart | FieldId::NightEnd
        )
    }

    /// Replace out-of-range values with the factory value
    pub fn sanitize(self, value: i32) -> i32 {
        let (min, max) = self.range();
        if value < min || value > max {
            self.default_value()
        } else {
            value
        }
    }
}

/// Flat table of small numeric settings
///
/// Implementations decide when writes reach non-volatile memory. Storage
/// failures must degrade to volatile operation rather than surface here.
pub trait PersistentStore {
    /// Read a field (unwritten fields read as their factory value)
    fn read_field(&mut self, id: FieldId) -> i32;

    /// Write a field, returning whether the value changed
    fn write_field(&mut self, id: FieldId, value: i32) -> bool;

    /// Make pending writes durable
    fn commit(&mut self);

    /// Read a field, replacing corrupt values with the factory value
    fn read_checked(&mut self, id: FieldId) -> i32 {
        id.sanitize(self.read_field(id))
    }
}

/// Write every field's factory value and commit
pub fn reset_to_defaults<S: PersistentStore + ?Sized>(store: &mut S) {
    for id in FieldId::ALL {
        store.write_field(id, id.default_value());
    }
    store.commit();
}
