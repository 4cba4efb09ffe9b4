//! Settings menu options

use heapless::Vec;

use crate::config::Capabilities;
use crate::nav::ClockFunction;
use crate::traits::FieldId;

/// Enabled settings, in menu order
pub type OptionList = Vec<FieldId, { FieldId::COUNT }>;

/// Every option the menu can offer, in menu order
pub const MENU: [FieldId; 13] = [
    FieldId::HourFormat,
    FieldId::LeadingZero,
    FieldId::DateFormat,
    FieldId::FadeDuration,
    FieldId::AutoDim,
    FieldId::NightMode,
    FieldId::NightStart,
    FieldId::NightEnd,
    FieldId::AlarmDays,
    FieldId::SnoozeMinutes,
    FieldId::DayCounterMonth,
    FieldId::DayCounterDay,
    FieldId::TimerRunout,
];

/// Whether this clock has the hardware or function a setting controls
pub fn is_available(id: FieldId, caps: &Capabilities) -> bool {
    match id {
        FieldId::FadeDuration => caps.crossfade,
        FieldId::AutoDim => caps.has_ambient,
        FieldId::AlarmDays | FieldId::SnoozeMinutes => caps.has(ClockFunction::Alarm),
        FieldId::DayCounterMonth | FieldId::DayCounterDay => {
            caps.has(ClockFunction::DayCounter)
        }
        FieldId::TimerRunout => caps.has(ClockFunction::Timer),
        _ => true,
    }
}

/// Filter the menu down to what `caps` supports
pub fn enabled_options(caps: &Capabilities) -> OptionList {
    let mut options = OptionList::new();
    for id in MENU {
        if is_available(id, caps) {
            // MENU is shorter than the list capacity
            let _ = options.push(id);
        }
    }
    options
}
