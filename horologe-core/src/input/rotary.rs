//! Rotary encoder detent accumulation
//!
//! Raw quadrature transitions are summed first, so opposite bursts cancel
//! before any detent is emitted. Four transitions make one detent; leftovers
//! carry over to the next call.

use crate::time::{elapsed, Millis};

/// Transitions per mechanical detent
pub const TRANSITIONS_PER_DETENT: i32 = 4;

/// Detents produced by one accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Detents {
    /// Signed detent count, positive toward Up
    pub count: i32,
    /// High-velocity flag after this accumulation
    pub fast: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RotaryAccumulator {
    pending: i32,
    last_detent: Option<Millis>,
    fast: bool,
    fast_ms: u32,
    slow_ms: u32,
}

impl RotaryAccumulator {
    /// `fast_ms` < `slow_ms`: detents closer than `fast_ms` switch to high
    /// velocity, detents further apart than `slow_ms` drop back.
    pub fn new(fast_ms: u32, slow_ms: u32) -> Self {
        Self {
            pending: 0,
            last_detent: None,
            fast: false,
            fast_ms,
            slow_ms,
        }
    }

    /// Add raw transitions and collect whole detents
    pub fn accumulate(&mut self, now: Millis, transitions: i32) -> Detents {
        self.pending = self.pending.saturating_add(transitions);
        let count = self.pending / TRANSITIONS_PER_DETENT;
        self.pending -= count * TRANSITIONS_PER_DETENT;

        match self.last_detent {
            Some(last) if count != 0 => {
                let gap = elapsed(now, last);
                if gap <= self.fast_ms {
                    self.fast = true;
                } else if gap >= self.slow_ms {
                    self.fast = false;
                }
            }
            Some(last) => {
                if elapsed(now, last) >= self.slow_ms {
                    self.fast = false;
                }
            }
            None => {}
        }

        if count != 0 {
            self.last_detent = Some(now);
        }

        Detents {
            count,
            fast: self.fast,
        }
    }

    /// Drop partial transitions (e.g. while another control is owned)
    pub fn discard(&mut self) {
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_four_transitions_per_detent() {
        let mut rotary = RotaryAccumulator::new(80, 500);
        assert_eq!(rotary.accumulate(0, 3).count, 0);
        assert_eq!(rotary.accumulate(1, 1).count, 1);
        assert_eq!(rotary.accumulate(2, -9).count, -2);
        // One transition toward Down left over
        assert_eq!(rotary.accumulate(3, -3).count, -1);
    }

    #[test]
    fn test_opposite_bursts_cancel() {
        let mut rotary = RotaryAccumulator::new(80, 500);
        assert_eq!(rotary.accumulate(0, 8 - 8).count, 0);
    }

    #[test]
    fn test_velocity_hysteresis() {
        let mut rotary = RotaryAccumulator::new(80, 500);
        assert!(!rotary.accumulate(0, 4).fast);
        // 50 ms apart: fast
        assert!(rotary.accumulate(50, 4).fast);
        // 200 ms apart: between thresholds, stays fast
        assert!(rotary.accumulate(250, 4).fast);
        // 600 ms apart: slow again
        assert!(!rotary.accumulate(850, 4).fast);
        // 200 ms apart from slow: stays slow
        assert!(!rotary.accumulate(1050, 4).fast);
    }

    #[test]
    fn test_velocity_decays_when_idle() {
        let mut rotary = RotaryAccumulator::new(80, 500);
        rotary.accumulate(0, 4);
        assert!(rotary.accumulate(10, 4).fast);
        assert!(rotary.accumulate(300, 0).fast);
        assert!(!rotary.accumulate(510, 0).fast);
    }

    proptest! {
        #[test]
        fn test_whole_detent_bursts(detents in proptest::collection::vec(-10i32..10, 0..50)) {
            let mut rotary = RotaryAccumulator::new(80, 500);
            let mut total = 0;
            for (i, n) in detents.iter().enumerate() {
                let got = rotary.accumulate(i as u32, n * TRANSITIONS_PER_DETENT).count;
                prop_assert_eq!(got, *n);
                total += got;
            }
            prop_assert_eq!(total, detents.iter().sum::<i32>());
        }

        #[test]
        fn test_leftover_stays_below_one_detent(bursts in proptest::collection::vec(-40i32..40, 0..50)) {
            let mut rotary = RotaryAccumulator::new(80, 500);
            let mut total = 0;
            for (i, burst) in bursts.iter().enumerate() {
                total += rotary.accumulate(i as u32, *burst).count;
            }
            let sum: i32 = bursts.iter().sum();
            prop_assert!((sum - total * TRANSITIONS_PER_DETENT).abs() < TRANSITIONS_PER_DETENT);
        }
    }
}
