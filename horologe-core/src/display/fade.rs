//! Crossfade timing
//!
//! The incoming digit's share of each slice's lit time grows from 0 to 100%
//! in proportion to elapsed time. The share is kept in thousandths, rounded
//! up, and forced to grow by at least one thousandth per step, so a fade
//! finishes within `duration` or 1000 steps, whichever comes first.

use crate::time::{elapsed, Millis};

/// Share value at which the incoming digit owns the whole slice
pub const FULL_SHARE: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeState {
    Idle,
    /// Requested; the clock starts on the next step
    Pending,
    Running { since: Millis, share: u16 },
}

/// Lit-time split for one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeStep {
    pub outgoing_us: u16,
    pub incoming_us: u16,
    /// The fade completed on this step
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossfade {
    state: FadeState,
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new()
    }
}

impl Crossfade {
    pub const fn new() -> Self {
        Self {
            state: FadeState::Idle,
        }
    }

    /// Start a new fade on the next step
    pub fn arm(&mut self) {
        self.state = FadeState::Pending;
    }

    pub fn cancel(&mut self) {
        self.state = FadeState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != FadeState::Idle
    }

    /// Incoming share in thousandths, if a fade is running
    pub fn share(&self) -> Option<u16> {
        match self.state {
            FadeState::Idle => None,
            FadeState::Pending => Some(0),
            FadeState::Running { share, .. } => Some(share),
        }
    }

    /// Advance the fade and split `lit_us` between outgoing and incoming
    ///
    /// Returns `None` when no fade is active.
    pub fn step(&mut self, now: Millis, duration_ms: u32, lit_us: u16) -> Option<FadeStep> {
        let (since, previous) = match self.state {
            FadeState::Idle => return None,
            FadeState::Pending => (now, 0),
            FadeState::Running { since, share } => (since, share),
        };

        let target = if duration_ms == 0 {
            FULL_SHARE as u64
        } else {
            let scaled = elapsed(now, since) as u64 * FULL_SHARE as u64;
            scaled.div_ceil(duration_ms as u64)
        };
        let share = (target.max(previous as u64 + 1)).min(FULL_SHARE as u64) as u16;

        let incoming_us = (lit_us as u32 * share as u32 / FULL_SHARE as u32) as u16;
        let finished = share >= FULL_SHARE;

        self.state = if finished {
            FadeState::Idle
        } else {
            FadeState::Running { since, share }
        };

        Some(FadeStep {
            outgoing_us: lit_us - incoming_us,
            incoming_us,
            finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_idle_has_no_step() {
        let mut fade = Crossfade::new();
        assert_eq!(fade.step(0, 50, 5000), None);
    }

    #[test]
    fn test_linear_progress() {
        let mut fade = Crossfade::new();
        fade.arm();
        let first = fade.step(100, 50, 5000).unwrap();
        assert_eq!(first.incoming_us, 5);
        assert!(!first.finished);

        let half = fade.step(125, 50, 5000).unwrap();
        assert_eq!(half.incoming_us, 2500);
        assert_eq!(half.outgoing_us, 2500);

        let done = fade.step(150, 50, 5000).unwrap();
        assert_eq!(done.incoming_us, 5000);
        assert!(done.finished);
        assert!(!fade.is_active());
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut fade = Crossfade::new();
        fade.arm();
        let step = fade.step(0, 0, 100).unwrap();
        assert!(step.finished);
        assert_eq!(step.incoming_us, 100);
    }

    #[test]
    fn test_progress_without_time_passing() {
        // A stalled clock must not stall the fade
        let mut fade = Crossfade::new();
        fade.arm();
        let mut steps = 0;
        while let Some(step) = fade.step(7, 1_000_000, 5000) {
            steps += 1;
            if step.finished {
                break;
            }
        }
        assert_eq!(steps, FULL_SHARE as usize);
    }

    proptest! {
        #[test]
        fn test_share_is_monotonic_and_terminates(
            duration in 1u32..2000,
            lit in 0u16..6000,
            start in any::<u32>(),
            increments in proptest::collection::vec(0u32..20, 1..400),
        ) {
            let mut fade = Crossfade::new();
            fade.arm();
            let mut now = start;
            let mut last_incoming = 0u16;
            let mut last_share = 0u16;
            let mut finished = false;
            for inc in increments {
                now = now.wrapping_add(inc);
                let step = fade.step(now, duration, lit).unwrap();
                prop_assert_eq!(step.incoming_us + step.outgoing_us, lit);
                prop_assert!(step.incoming_us >= last_incoming);
                last_incoming = step.incoming_us;
                if step.finished {
                    finished = true;
                    break;
                }
                let share = fade.share().unwrap();
                prop_assert!(share > last_share);
                last_share = share;
            }
            if !finished {
                // Once the full duration has passed the next step must finish
                let step = fade.step(now.wrapping_add(duration), duration, lit).unwrap();
                prop_assert!(step.finished);
            }
        }
    }
}
