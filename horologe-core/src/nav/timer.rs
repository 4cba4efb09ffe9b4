//! Countdown timer and chronograph

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::{elapsed, has_elapsed, Millis};

/// What a countdown does when it reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimerRunoutPolicy {
    /// Halt at zero
    #[default]
    Stop,
    /// Reload the duration and keep counting down
    Repeat,
    /// Switch to counting up from zero
    Chrono,
}

impl TimerRunoutPolicy {
    /// Decode the stored field value; unknown values fall back to `Stop`
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => TimerRunoutPolicy::Repeat,
            2 => TimerRunoutPolicy::Chrono,
            _ => TimerRunoutPolicy::Stop,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            TimerRunoutPolicy::Stop => 0,
            TimerRunoutPolicy::Repeat => 1,
            TimerRunoutPolicy::Chrono => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            TimerRunoutPolicy::Stop => TimerRunoutPolicy::Repeat,
            TimerRunoutPolicy::Repeat => TimerRunoutPolicy::Chrono,
            TimerRunoutPolicy::Chrono => TimerRunoutPolicy::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lap {
    ms: u32,
    at: Millis,
}

/// Timer state
///
/// The running value is `base_ms` plus or minus the time since
/// `started_at`; stopping folds the elapsed time back into `base_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    running: bool,
    cleared: bool,
    direction: Direction,
    base_ms: u32,
    started_at: Millis,
    duration_ms: u32,
    policy: TimerRunoutPolicy,
    lap: Option<Lap>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            running: false,
            cleared: true,
            direction: Direction::Down,
            base_ms: 0,
            started_at: 0,
            duration_ms: 0,
            policy: TimerRunoutPolicy::Stop,
            lap: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stopped with nothing on the clock
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn policy(&self) -> TimerRunoutPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TimerRunoutPolicy) {
        self.policy = policy;
    }

    /// Start, or resume a paused run
    ///
    /// From the cleared state a non-zero `duration_ms` counts down; zero
    /// counts up as a chronograph.
    pub fn start(&mut self, now: Millis, duration_ms: u32) {
        if self.running {
            return;
        }
        if self.cleared {
            self.duration_ms = duration_ms;
            self.base_ms = duration_ms;
            self.direction = if duration_ms > 0 {
                Direction::Down
            } else {
                Direction::Up
            };
            self.cleared = false;
        }
        self.started_at = now;
        self.running = true;
    }

    pub fn stop(&mut self, now: Millis) {
        if self.running {
            self.base_ms = self.value_ms(now);
            self.running = false;
        }
    }

    pub fn toggle(&mut self, now: Millis, duration_ms: u32) {
        if self.running {
            self.stop(now);
        } else {
            self.start(now, duration_ms);
        }
    }

    pub fn clear(&mut self) {
        *self = Self {
            policy: self.policy,
            ..Self::new()
        };
    }

    /// Freeze the current value for display
    pub fn lap(&mut self, now: Millis) {
        self.lap = Some(Lap {
            ms: self.value_ms(now),
            at: now,
        });
    }

    /// Frozen lap value, while younger than `hold_ms`
    pub fn lap_value(&mut self, now: Millis, hold_ms: u32) -> Option<u32> {
        let lap = self.lap?;
        if has_elapsed(now, lap.at, hold_ms) {
            self.lap = None;
            None
        } else {
            Some(lap.ms)
        }
    }

    /// Current value in milliseconds (remaining for a countdown)
    pub fn value_ms(&self, now: Millis) -> u32 {
        if !self.running {
            return self.base_ms;
        }
        let run = elapsed(now, self.started_at);
        match self.direction {
            Direction::Down => self.base_ms.saturating_sub(run),
            Direction::Up => self.base_ms.saturating_add(run),
        }
    }

    /// Current value in whole seconds, rounding a countdown up
    pub fn value_seconds(&self, now: Millis) -> u32 {
        let ms = self.value_ms(now);
        match self.direction {
            Direction::Down => ms.div_ceil(1000),
            Direction::Up => ms / 1000,
        }
    }

    /// Apply the runout policy; `true` when a countdown just reached zero
    pub fn tick(&mut self, now: Millis) -> bool {
        if !self.running || self.direction != Direction::Down {
            return false;
        }
        let run = elapsed(now, self.started_at);
        if run < self.base_ms {
            return false;
        }
        let overshoot = run - self.base_ms;

        match self.policy {
            TimerRunoutPolicy::Stop => self.clear(),
            TimerRunoutPolicy::Repeat if self.duration_ms > 0 => {
                self.base_ms = self.duration_ms;
                self.started_at = now.wrapping_sub(overshoot % self.duration_ms);
            }
            TimerRunoutPolicy::Repeat | TimerRunoutPolicy::Chrono => {
                self.direction = Direction::Up;
                self.base_ms = 0;
                self.started_at = now.wrapping_sub(overshoot);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_stop_policy() {
        let mut timer = Timer::new();
        timer.start(1000, 10_000);
        assert_eq!(timer.value_seconds(1001), 10);
        assert_eq!(timer.value_seconds(2000), 9);
        assert!(!timer.tick(10_999));
        assert!(timer.tick(11_000));
        assert!(!timer.is_running());
        assert!(timer.is_cleared());
        assert_eq!(timer.value_ms(20_000), 0);
        assert!(!timer.tick(20_000));
    }

    #[test]
    fn test_restart_after_stop_runout_reloads_duration() {
        let mut timer = Timer::new();
        timer.start(0, 2000);
        assert!(timer.tick(2000));
        timer.start(3000, 2000);
        assert!(timer.is_running());
        assert_eq!(timer.direction(), Direction::Down);
        assert!(!timer.tick(3001));
        assert_eq!(timer.value_seconds(3001), 2);
    }

    #[test]
    fn test_repeat_reloads_keeping_phase() {
        let mut timer = Timer::new();
        timer.set_policy(TimerRunoutPolicy::Repeat);
        timer.start(0, 5000);
        assert!(timer.tick(5200));
        assert!(timer.is_running());
        assert_eq!(timer.value_ms(5200), 4800);
    }

    #[test]
    fn test_chrono_counts_up_after_runout() {
        let mut timer = Timer::new();
        timer.set_policy(TimerRunoutPolicy::Chrono);
        timer.start(0, 3000);
        assert!(timer.tick(3500));
        assert_eq!(timer.direction(), Direction::Up);
        assert_eq!(timer.value_ms(4500), 1500);
        assert!(!timer.tick(9000));
    }

    #[test]
    fn test_zero_duration_is_chronograph() {
        let mut timer = Timer::new();
        timer.start(100, 0);
        assert_eq!(timer.direction(), Direction::Up);
        assert_eq!(timer.value_seconds(2_150), 2);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut timer = Timer::new();
        timer.toggle(0, 0);
        timer.toggle(4000, 0);
        assert!(!timer.is_running());
        assert_eq!(timer.value_ms(9000), 4000);
        timer.toggle(10_000, 60_000);
        assert_eq!(timer.direction(), Direction::Up);
        assert_eq!(timer.value_ms(11_000), 5000);
    }

    #[test]
    fn test_clear_keeps_policy() {
        let mut timer = Timer::new();
        timer.set_policy(TimerRunoutPolicy::Chrono);
        timer.start(0, 1000);
        timer.stop(500);
        timer.clear();
        assert!(timer.is_cleared());
        assert_eq!(timer.policy(), TimerRunoutPolicy::Chrono);
        assert_eq!(timer.value_ms(900), 0);
    }

    #[test]
    fn test_lap_expires() {
        let mut timer = Timer::new();
        timer.start(0, 0);
        timer.lap(2500);
        assert_eq!(timer.lap_value(4000, 3000), Some(2500));
        assert_eq!(timer.lap_value(5500, 3000), None);
        assert_eq!(timer.lap_value(5600, 3000), None);
    }

    #[test]
    fn test_runs_across_counter_wrap() {
        let mut timer = Timer::new();
        let start = u32::MAX - 500;
        timer.start(start, 2000);
        assert!(!timer.tick(start.wrapping_add(1999)));
        assert!(timer.tick(start.wrapping_add(2000)));
    }

    #[test]
    fn test_policy_values() {
        for policy in [
            TimerRunoutPolicy::Stop,
            TimerRunoutPolicy::Repeat,
            TimerRunoutPolicy::Chrono,
        ] {
            assert_eq!(TimerRunoutPolicy::from_value(policy.value()), policy);
        }
        assert_eq!(TimerRunoutPolicy::from_value(7), TimerRunoutPolicy::Stop);
        assert_eq!(
            TimerRunoutPolicy::Chrono.next(),
            TimerRunoutPolicy::Stop
        );
    }
}
