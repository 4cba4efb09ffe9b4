//! Clock functions

/// What the display is dedicated to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockFunction {
    TimeOfDay,
    Date,
    Alarm,
    /// Countdown timer and chronograph
    Timer,
    Thermometer,
    /// Cycles every digit through 0-9
    TubeTest,
    /// Days until a configured date (a page of `Date`)
    DayCounter,
    /// Next sunrise or sunset (a page of `Date`)
    Sun,
    /// Outdoor temperature (a page of `Date`)
    Weather,
    /// Firmware version, shown when Select is held at power-on
    Version,
    /// Settings menu entry, by index into the enabled option list
    SettingsOption(u8),
}

impl ClockFunction {
    /// Functions reachable by cycling with Select, in display order
    pub const ROTATION: [ClockFunction; 6] = [
        ClockFunction::TimeOfDay,
        ClockFunction::Date,
        ClockFunction::Alarm,
        ClockFunction::Timer,
        ClockFunction::Thermometer,
        ClockFunction::TubeTest,
    ];

    /// Pages shown after `Date`, in order
    pub const DATE_PAGES: [ClockFunction; 4] = [
        ClockFunction::Date,
        ClockFunction::DayCounter,
        ClockFunction::Sun,
        ClockFunction::Weather,
    ];

    /// Stable number used in capability sets and the stored Alt preset
    pub fn ordinal(self) -> Option<u8> {
        match self {
            ClockFunction::TimeOfDay => Some(0),
            ClockFunction::Date => Some(1),
            ClockFunction::Alarm => Some(2),
            ClockFunction::Timer => Some(3),
            ClockFunction::Thermometer => Some(4),
            ClockFunction::TubeTest => Some(5),
            ClockFunction::DayCounter => Some(6),
            ClockFunction::Sun => Some(7),
            ClockFunction::Weather => Some(8),
            ClockFunction::Version => Some(9),
            ClockFunction::SettingsOption(_) => None,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(ClockFunction::TimeOfDay),
            1 => Some(ClockFunction::Date),
            2 => Some(ClockFunction::Alarm),
            3 => Some(ClockFunction::Timer),
            4 => Some(ClockFunction::Thermometer),
            5 => Some(ClockFunction::TubeTest),
            6 => Some(ClockFunction::DayCounter),
            7 => Some(ClockFunction::Sun),
            8 => Some(ClockFunction::Weather),
            9 => Some(ClockFunction::Version),
            _ => None,
        }
    }

    /// Reverts to time of day after the idle timeout
    pub fn is_temporary(self) -> bool {
        !matches!(
            self,
            ClockFunction::TimeOfDay | ClockFunction::TubeTest | ClockFunction::Version
        )
    }

    /// Part of the date page sequence
    pub fn is_date_page(self) -> bool {
        Self::DATE_PAGES.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_roundtrip() {
        for ordinal in 0..10 {
            let function = ClockFunction::from_ordinal(ordinal).unwrap();
            assert_eq!(function.ordinal(), Some(ordinal));
        }
        assert_eq!(ClockFunction::from_ordinal(10), None);
        assert_eq!(ClockFunction::SettingsOption(3).ordinal(), None);
    }

    #[test]
    fn test_temporary() {
        assert!(!ClockFunction::TimeOfDay.is_temporary());
        assert!(ClockFunction::Date.is_temporary());
        assert!(ClockFunction::Sun.is_temporary());
        assert!(!ClockFunction::TubeTest.is_temporary());
    }
}
