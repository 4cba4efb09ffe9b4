//! Editable fields and the scratch edit session
//!
//! Every edit works on a scratch copy of the values being changed. Nothing
//! reaches the clock or the store until the machine commits the session, so
//! abandoning an edit (timeout, power loss) leaves the committed values as
//! they were.

use heapless::Vec;

use crate::time::days_in_month;
use crate::traits::store::Overflow;
use crate::traits::FieldId;

/// Most fields any edit walks through
pub const MAX_FIELDS: usize = 3;

/// Most scratch values any edit holds
pub const MAX_SLOTS: usize = 3;

/// Upper bound of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    Fixed(i32),
    /// Days in the month held in `month_slot`; a missing year allows 29 February
    DaysInMonth { year_slot: Option<u8>, month_slot: u8 },
}

/// Metadata for one editable field
///
/// With a `span`, the field is one component of a composite value:
/// component = `(value / unit) % span`, bounded by `min..=max`, and
/// adjusting it leaves the other components alone (an hour field is
/// `unit: 60, span: Some(24)` over minutes since midnight). Without a span
/// the whole value moves by `unit` per step, bounded by `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    pub slot: u8,
    pub unit: i32,
    pub span: Option<i32>,
    pub min: i32,
    pub max: Bound,
    pub overflow: Overflow,
}

impl FieldSpec {
    const fn component(slot: u8, unit: i32, span: i32, overflow: Overflow) -> Self {
        Self {
            slot,
            unit,
            span: Some(span),
            min: 0,
            max: Bound::Fixed(span - 1),
            overflow,
        }
    }

    const fn plain(slot: u8, min: i32, max: Bound, overflow: Overflow) -> Self {
        Self {
            slot,
            unit: 1,
            span: None,
            min,
            max,
            overflow,
        }
    }
}

const HOUR: FieldSpec = FieldSpec::component(0, 60, 24, Overflow::Wrap);
const MINUTE: FieldSpec = FieldSpec::component(0, 1, 60, Overflow::Wrap);

const TIME_FIELDS: [FieldSpec; 2] = [HOUR, MINUTE];

const DATE_FIELDS: [FieldSpec; 3] = [
    FieldSpec::plain(0, 2000, Bound::Fixed(2099), Overflow::Saturate),
    FieldSpec::plain(1, 1, Bound::Fixed(12), Overflow::Wrap),
    FieldSpec::plain(
        2,
        1,
        Bound::DaysInMonth {
            year_slot: Some(0),
            month_slot: 1,
        },
        Overflow::Wrap,
    ),
];

const DURATION_FIELDS: [FieldSpec; 3] = [
    FieldSpec::component(0, 3600, 24, Overflow::Saturate),
    FieldSpec::component(0, 60, 60, Overflow::Wrap),
    FieldSpec::component(0, 1, 60, Overflow::Wrap),
];

/// What a session edits, and so where a commit goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditTarget {
    /// Time of day as minutes since midnight (seconds reset on commit)
    Time,
    /// Year, month, day
    Date,
    /// Alarm time, minutes since midnight
    Alarm,
    /// Countdown length in seconds
    TimerDuration,
    /// One stored setting
    Setting(FieldId),
}

/// Scratch state of an edit in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    target: EditTarget,
    values: [i32; MAX_SLOTS],
    fields: Vec<FieldSpec, MAX_FIELDS>,
    cursor: u8,
    touched: bool,
}

impl EditSession {
    fn new(target: EditTarget, values: [i32; MAX_SLOTS], specs: &[FieldSpec]) -> Self {
        let mut fields = Vec::new();
        for spec in specs.iter().take(MAX_FIELDS) {
            // Capacity is checked by take()
            let _ = fields.push(*spec);
        }
        Self {
            target,
            values,
            fields,
            cursor: 0,
            touched: false,
        }
    }

    pub fn time(minutes: u16) -> Self {
        Self::new(EditTarget::Time, [minutes as i32, 0, 0], &TIME_FIELDS)
    }

    pub fn alarm(minutes: i32) -> Self {
        Self::new(EditTarget::Alarm, [minutes, 0, 0], &TIME_FIELDS)
    }

    pub fn date(year: u16, month: u8, day: u8) -> Self {
        Self::new(
            EditTarget::Date,
            [year as i32, month as i32, day as i32],
            &DATE_FIELDS,
        )
    }

    pub fn timer_duration(seconds: i32) -> Self {
        Self::new(EditTarget::TimerDuration, [seconds, 0, 0], &DURATION_FIELDS)
    }

    /// Single-field session over a stored setting, stepping by its step size
    pub fn setting(id: FieldId, value: i32) -> Self {
        let (min, max) = id.range();
        let spec = FieldSpec {
            slot: 0,
            unit: id.step(),
            span: None,
            min,
            max: Bound::Fixed(max),
            overflow: id.overflow(),
        };
        Self::new(EditTarget::Setting(id), [value, 0, 0], &[spec])
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    pub fn field_count(&self) -> u8 {
        self.fields.len() as u8
    }

    /// Whether any adjustment happened
    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn value(&self, slot: u8) -> i32 {
        self.values.get(slot as usize).copied().unwrap_or(0)
    }

    pub fn values(&self) -> &[i32; MAX_SLOTS] {
        &self.values
    }

    /// Move to the next field; `false` when already on the last one
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.field_count() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Change the field under the cursor by `delta` steps
    pub fn adjust(&mut self, delta: i32) {
        let Some(spec) = self.fields.get(self.cursor as usize).copied() else {
            return;
        };
        let slot = spec.slot as usize;
        let max = self.resolve(spec.max);
        let value = self.values[slot];

        self.values[slot] = match spec.span {
            Some(span) => {
                let component = (value / spec.unit).rem_euclid(span);
                let next = bounded(component + delta, spec.min, max, spec.overflow);
                value + (next - component) * spec.unit
            }
            None => bounded(value + delta * spec.unit, spec.min, max, spec.overflow),
        };
        self.touched = true;
        self.clamp_dependents();
    }

    fn resolve(&self, bound: Bound) -> i32 {
        match bound {
            Bound::Fixed(max) => max,
            Bound::DaysInMonth {
                year_slot,
                month_slot,
            } => {
                // 2000 is a leap year, so an unknown year allows 29 February
                let year = year_slot.map(|s| self.value(s)).unwrap_or(2000);
                let month = self.value(month_slot).clamp(1, 12);
                days_in_month(year.clamp(0, u16::MAX as i32) as u16, month as u8) as i32
            }
        }
    }

    /// Pull values whose bound depends on another field back into range
    fn clamp_dependents(&mut self) {
        for i in 0..self.fields.len() {
            let spec = self.fields[i];
            if let Bound::DaysInMonth { .. } = spec.max {
                let max = self.resolve(spec.max);
                let slot = spec.slot as usize;
                self.values[slot] = self.values[slot].clamp(spec.min, max);
            }
        }
    }
}

/// Apply a field's overflow policy
fn bounded(value: i32, min: i32, max: i32, overflow: Overflow) -> i32 {
    if max < min {
        return min;
    }
    match overflow {
        Overflow::Saturate => value.clamp(min, max),
        Overflow::Wrap => min + (value - min).rem_euclid(max - min + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hour_field_steps_by_sixty_minutes() {
        let mut session = EditSession::alarm(90);
        for _ in 0..5 {
            session.adjust(1);
        }
        assert_eq!(session.value(0), 390);
    }

    #[test]
    fn test_hour_wraps_keeping_minutes() {
        let mut session = EditSession::time(23 * 60 + 30);
        session.adjust(1);
        assert_eq!(session.value(0), 30);
        session.adjust(-1);
        assert_eq!(session.value(0), 23 * 60 + 30);
    }

    #[test]
    fn test_minute_wraps_within_hour() {
        let mut session = EditSession::time(60 + 59);
        assert!(session.advance());
        session.adjust(1);
        assert_eq!(session.value(0), 60);
        session.adjust(-10);
        assert_eq!(session.value(0), 60 + 50);
        assert!(!session.advance());
    }

    #[test]
    fn test_date_day_follows_month() {
        let mut session = EditSession::date(2023, 1, 31);
        session.advance();
        session.adjust(1);
        assert_eq!(session.values(), &[2023, 2, 28]);

        session.advance();
        session.adjust(1);
        assert_eq!(session.value(2), 1);
    }

    #[test]
    fn test_year_saturates() {
        let mut session = EditSession::date(2099, 6, 1);
        session.adjust(10);
        assert_eq!(session.value(0), 2099);
    }

    #[test]
    fn test_timer_hours_saturate() {
        let mut session = EditSession::timer_duration(23 * 3600 + 5);
        session.adjust(1);
        assert_eq!(session.value(0), 23 * 3600 + 5);
        session.advance();
        session.adjust(-1);
        assert_eq!(session.value(0), 23 * 3600 + 59 * 60 + 5);
    }

    #[test]
    fn test_setting_uses_step_and_policy() {
        let mut session = EditSession::setting(FieldId::NightStart, 1435);
        session.adjust(1);
        assert_eq!(session.value(0), 10);

        let mut session = EditSession::setting(FieldId::SnoozeMinutes, 58);
        session.adjust(10);
        assert_eq!(session.value(0), 60);
        assert!(session.touched());
    }

    proptest! {
        #[test]
        fn test_adjust_stays_in_range(
            start in 0i32..1440,
            deltas in proptest::collection::vec(-30i32..30, 0..30),
            on_minutes in any::<bool>(),
        ) {
            let mut session = EditSession::alarm(start);
            if on_minutes {
                session.advance();
            }
            for delta in deltas {
                session.adjust(delta);
                let value = session.value(0);
                prop_assert!((0..1440).contains(&value));
                // The other component never moves
                if on_minutes {
                    prop_assert_eq!(value / 60, start / 60);
                } else {
                    prop_assert_eq!(value % 60, start % 60);
                }
            }
        }
    }
}
