//! Brightness policy
//!
//! Resolves the navigation-level brightness request, the ambient light
//! reading and the editing flag into one [`Drive`] command. Editing wins over
//! everything else; ambient dimming only applies at normal level.

use crate::time::{elapsed, Millis};
use crate::traits::Drive;

/// Brightness level requested by navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrightnessLevel {
    Off,
    Dim,
    #[default]
    Normal,
}

/// Stateful brightness resolver
///
/// Tracks when editing began so the square wave always opens on full
/// intensity.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessPolicy {
    edit_blink_ms: u32,
    edit_since: Option<Millis>,
}

impl BrightnessPolicy {
    pub fn new(edit_blink_ms: u32) -> Self {
        Self {
            edit_blink_ms: edit_blink_ms.max(1),
            edit_since: None,
        }
    }

    /// Resolve the drive for this cycle
    ///
    /// The last argument is the backend's `(dim, full)` intensity bounds.
    pub fn resolve(
        &mut self,
        now: Millis,
        level: BrightnessLevel,
        ambient_enabled: bool,
        ambient: u8,
        editing: bool,
        (dim, full): (u16, u16),
    ) -> Drive {
        if editing {
            let since = *self.edit_since.get_or_insert(now);
            let phase = elapsed(now, since) / self.edit_blink_ms;
            return if phase % 2 == 0 {
                Drive::Lit(full)
            } else {
                Drive::Lit(dim)
            };
        }
        self.edit_since = None;

        match level {
            BrightnessLevel::Off => Drive::Dark,
            BrightnessLevel::Dim => Drive::Lit(dim),
            BrightnessLevel::Normal if ambient_enabled => {
                Drive::Lit(ambient_intensity(ambient, dim, full))
            }
            BrightnessLevel::Normal => Drive::Lit(full),
        }
    }
}

/// Map an ambient reading (0-255) linearly onto `dim..=full`
pub fn ambient_intensity(ambient: u8, dim: u16, full: u16) -> u16 {
    let span = full.saturating_sub(dim) as u32;
    dim + (ambient as u32 * span / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let mut policy = BrightnessPolicy::new(500);
        assert_eq!(
            policy.resolve(0, BrightnessLevel::Off, false, 0, false, (2, 15)),
            Drive::Dark
        );
        assert_eq!(
            policy.resolve(0, BrightnessLevel::Dim, true, 255, false, (2, 15)),
            Drive::Lit(2)
        );
        assert_eq!(
            policy.resolve(0, BrightnessLevel::Normal, false, 0, false, (2, 15)),
            Drive::Lit(15)
        );
    }

    #[test]
    fn test_ambient_mapping() {
        assert_eq!(ambient_intensity(0, 50, 5000), 50);
        assert_eq!(ambient_intensity(255, 50, 5000), 5000);
        assert_eq!(ambient_intensity(128, 0, 255), 128);

        let mut policy = BrightnessPolicy::new(500);
        assert_eq!(
            policy.resolve(0, BrightnessLevel::Normal, true, 0, false, (50, 5000)),
            Drive::Lit(50)
        );
    }

    #[test]
    fn test_editing_square_wave_overrides_level() {
        let mut policy = BrightnessPolicy::new(500);
        let start = u32::MAX - 200;
        assert_eq!(
            policy.resolve(start, BrightnessLevel::Off, false, 0, true, (1, 9)),
            Drive::Lit(9)
        );
        assert_eq!(
            policy.resolve(start.wrapping_add(499), BrightnessLevel::Off, false, 0, true, (1, 9)),
            Drive::Lit(9)
        );
        assert_eq!(
            policy.resolve(start.wrapping_add(500), BrightnessLevel::Off, false, 0, true, (1, 9)),
            Drive::Lit(1)
        );
        assert_eq!(
            policy.resolve(start.wrapping_add(1000), BrightnessLevel::Off, false, 0, true, (1, 9)),
            Drive::Lit(9)
        );
    }

    #[test]
    fn test_editing_restarts_on_full() {
        let mut policy = BrightnessPolicy::new(500);
        policy.resolve(0, BrightnessLevel::Normal, false, 0, true, (1, 9));
        assert_eq!(
            policy.resolve(600, BrightnessLevel::Normal, false, 0, true, (1, 9)),
            Drive::Lit(1)
        );
        policy.resolve(700, BrightnessLevel::Normal, false, 0, false, (1, 9));
        assert_eq!(
            policy.resolve(800, BrightnessLevel::Normal, false, 0, true, (1, 9)),
            Drive::Lit(9)
        );
    }
}
