//! Quadrature decoding
//!
//! Counts raw Gray-code transitions; the core's classifier turns every four
//! of them into one detent.

/// Source of accumulated quadrature transitions
pub trait TransitionCounter {
    /// Signed transitions since the last call
    fn take(&mut self) -> i32;
}

/// No rotary fitted
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRotary;

impl TransitionCounter for NoRotary {
    fn take(&mut self) -> i32 {
        0
    }
}

/// Transition lookup indexed by `previous << 2 | current`, states as `A << 1 | B`
///
/// A leading B counts up. Same-state and double-step (invalid) entries are 0.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Software decoder fed from pin levels (polling or edge interrupts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadratureDecoder {
    state: u8,
    count: i32,
}

impl QuadratureDecoder {
    /// Start from the current pin levels
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            state: Self::encode(a, b),
            count: 0,
        }
    }

    fn encode(a: bool, b: bool) -> u8 {
        (a as u8) << 1 | b as u8
    }

    /// Feed new pin levels; returns the step applied (-1, 0 or 1)
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        let next = Self::encode(a, b);
        let step = TRANSITIONS[((self.state << 2) | next) as usize];
        self.state = next;
        self.count = self.count.wrapping_add(step as i32);
        step
    }

    pub fn pending(&self) -> i32 {
        self.count
    }
}

impl TransitionCounter for QuadratureDecoder {
    fn take(&mut self) -> i32 {
        core::mem::take(&mut self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FORWARD: [(bool, bool); 4] = [(true, false), (true, true), (false, true), (false, false)];

    #[test]
    fn test_forward_detent_is_four() {
        let mut decoder = QuadratureDecoder::new(false, false);
        for (a, b) in FORWARD {
            assert_eq!(decoder.update(a, b), 1);
        }
        assert_eq!(decoder.take(), 4);
        assert_eq!(decoder.take(), 0);
    }

    #[test]
    fn test_reverse_detent() {
        let mut decoder = QuadratureDecoder::new(false, false);
        for (a, b) in FORWARD.iter().rev().skip(1).chain([(false, false)].iter()) {
            decoder.update(*a, *b);
        }
        assert_eq!(decoder.take(), -4);
    }

    #[test]
    fn test_bounce_and_skips_cancel() {
        let mut decoder = QuadratureDecoder::new(false, false);
        decoder.update(true, false);
        decoder.update(false, false);
        // Both lines changing at once is a missed state, not a step
        assert_eq!(decoder.update(true, true), 0);
        assert_eq!(decoder.take(), 0);
    }

    proptest! {
        #[test]
        fn test_full_cycles_count_exactly(forward in 0usize..20, backward in 0usize..20) {
            let mut decoder = QuadratureDecoder::new(false, false);
            for _ in 0..forward {
                for (a, b) in FORWARD {
                    decoder.update(a, b);
                }
            }
            for _ in 0..backward {
                for (a, b) in [(false, true), (true, true), (true, false), (false, false)] {
                    decoder.update(a, b);
                }
            }
            prop_assert_eq!(decoder.take(), 4 * forward as i32 - 4 * backward as i32);
        }
    }
}
