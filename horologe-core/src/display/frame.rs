//! Digit buffer and decimal decomposition

use crate::traits::{Digit, MAX_DIGITS};

/// Write `value` into `digits[start..=end]`, least significant digit at `end`
///
/// Digits that do not fit are truncated from the high end (10015 in a
/// 4-wide field shows 0015). High positions past the value's own digits get
/// `0` when `leading_zeros` is set and blank otherwise; the units position is
/// always a digit. Positions beyond `digits.len()` are skipped, and
/// `start > end` writes nothing.
pub fn write_value(digits: &mut [Digit], value: u32, start: u8, end: u8, leading_zeros: bool) {
    if start > end {
        return;
    }

    for (place_index, position) in (start..=end).rev().enumerate() {
        let Some(slot) = digits.get_mut(position as usize) else {
            continue;
        };

        let significant = match 10u32.checked_pow(place_index as u32) {
            Some(place) if value >= place => Some(Digit::from_low(value / place)),
            _ => None,
        };

        *slot = match significant {
            Some(digit) => digit,
            None if place_index == 0 => Digit::ZERO,
            None if leading_zeros => Digit::ZERO,
            None => Digit::BLANK,
        };
    }
}

/// Blank `digits[start..=end]`, skipping out-of-range positions
pub fn write_blank(digits: &mut [Digit], start: u8, end: u8) {
    if start > end {
        return;
    }
    for position in start..=end {
        if let Some(slot) = digits.get_mut(position as usize) {
            *slot = Digit::BLANK;
        }
    }
}

/// What the display is showing and what it is moving toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFrame {
    /// Digits currently lit (the outgoing side of a crossfade)
    pub shown: [Digit; MAX_DIGITS],
    /// Digits most recently written (the incoming side)
    pub next: [Digit; MAX_DIGITS],
    /// Active positions
    pub width: u8,
}

impl DisplayFrame {
    pub fn new(width: u8) -> Self {
        Self {
            shown: [Digit::BLANK; MAX_DIGITS],
            next: [Digit::BLANK; MAX_DIGITS],
            width: width.min(MAX_DIGITS as u8),
        }
    }

    /// Target digits within the active width
    pub fn digits(&self) -> &[Digit] {
        &self.next[..self.width as usize]
    }

    /// Finish any transition: shown becomes next
    pub fn settle(&mut self) {
        self.shown = self.next;
    }

    pub fn is_settled(&self) -> bool {
        self.shown == self.next
    }
}
