//! Display driver
//!
//! Owns the digit buffer and decides, once per [`DisplayDriver::cycle`], what
//! the backend should do: expire the acknowledgement blink, resolve the
//! brightness drive, then either light the next multiplex slice or re-latch
//! changed digits.
//!
//! Nothing here blocks; the only waiting happens inside a multiplexed
//! backend's `refresh_slice`, bounded by one slice duration.

use crate::config::DisplayConfig;
use crate::time::{has_elapsed, Millis};
use crate::traits::{
    BackendCaps, Digit, DigitSink, DisplayBackend, DisplayError, Drive, SliceFrame, MAX_DIGITS,
};

use super::brightness::{BrightnessLevel, BrightnessPolicy};
use super::fade::Crossfade;
use super::frame::{write_blank, write_value, DisplayFrame};

/// Acknowledgement blink state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blink {
    Idle,
    /// Requested; the timer starts on the next cycle
    Armed,
    Since(Millis),
}

/// Backend-independent display driver
pub struct DisplayDriver<B: DisplayBackend> {
    backend: B,
    caps: BackendCaps,
    frame: DisplayFrame,
    brightness: BrightnessPolicy,
    fade: Crossfade,
    fade_ms: u32,
    blink: Blink,
    blink_ms: u32,
    /// Last drive sent to the backend
    drive: Option<Drive>,
    /// Next multiplex slice to light
    slice: u8,
    /// Latched backends: digits changed since the last latch
    latch_pending: bool,
    errors: u32,
    faulted: bool,
}

impl<B: DisplayBackend> DisplayDriver<B> {
    pub fn new(backend: B, config: &DisplayConfig) -> Self {
        let caps = backend.caps();
        debug!(
            "Display: width={}, multiplexed={}, crossfade={}",
            caps.width,
            caps.multiplexed,
            caps.crossfade
        );
        Self {
            backend,
            caps,
            frame: DisplayFrame::new(caps.width),
            brightness: BrightnessPolicy::new(config.edit_blink_ms),
            fade: Crossfade::new(),
            fade_ms: 0,
            blink: Blink::Idle,
            blink_ms: config.blink_ms,
            drive: None,
            slice: 0,
            latch_pending: true,
            errors: 0,
            faulted: false,
        }
    }

    /// Service blink, brightness and refresh
    ///
    /// Call every loop iteration. Multiplexed backends light exactly one
    /// slice per call.
    pub fn cycle(
        &mut self,
        now: Millis,
        level: BrightnessLevel,
        ambient_enabled: bool,
        ambient: u8,
        editing_field_active: bool,
    ) {
        match self.blink {
            Blink::Armed => self.blink = Blink::Since(now),
            Blink::Since(start) if has_elapsed(now, start, self.blink_ms) => {
                self.blink = Blink::Idle;
                self.latch_pending = true;
            }
            _ => {}
        }

        let drive = if self.is_blinking() {
            Drive::Dark
        } else {
            self.brightness.resolve(
                now,
                level,
                ambient_enabled,
                ambient,
                editing_field_active,
                (self.caps.dim, self.caps.full),
            )
        };
        self.apply_drive(drive);

        if self.caps.multiplexed {
            self.refresh_slice(now, drive);
        } else if self.latch_pending {
            // Latched hardware never crossfades
            self.frame.settle();
            self.fade.cancel();
            let result = self.backend.latch(self.frame.digits());
            if self.record(result) {
                self.latch_pending = false;
            }
        }
    }

    fn refresh_slice(&mut self, now: Millis, drive: Drive) {
        let lit_us = match drive {
            Drive::Dark => 0,
            Drive::Lit(us) => us,
        };

        let (outgoing_us, incoming_us) = match self.fade.step(now, self.fade_ms, lit_us) {
            Some(step) => {
                if step.finished {
                    self.frame.settle();
                }
                (step.outgoing_us, step.incoming_us)
            }
            None => (0, lit_us),
        };

        let frame = SliceFrame {
            outgoing: self.frame.shown,
            incoming: self.frame.next,
            outgoing_us,
            incoming_us,
        };
        let result = self.backend.refresh_slice(self.slice, &frame);
        self.record(result);

        self.slice = (self.slice + 1) % self.caps.slices.max(1);
    }

    /// Send a drive command if it differs from the last one
    fn apply_drive(&mut self, drive: Drive) {
        if self.drive == Some(drive) {
            return;
        }
        let result = self.backend.set_drive(drive);
        if self.record(result) {
            self.drive = Some(drive);
        }
    }

    /// Count a backend result; returns whether it succeeded
    fn record(&mut self, result: Result<(), DisplayError>) -> bool {
        match result {
            Ok(()) => {
                if self.faulted {
                    info!("Display backend recovered, {} errors so far", self.errors);
                    self.faulted = false;
                }
                true
            }
            Err(e) => {
                self.errors = self.errors.saturating_add(1);
                if !self.faulted {
                    warn!("Display backend error: {}", e);
                    self.faulted = true;
                }
                false
            }
        }
    }

    /// Replace the target digits, fading if requested and supported
    fn update(&mut self, next: [Digit; MAX_DIGITS], fade: bool) {
        if next == self.frame.next {
            return;
        }

        if fade && self.caps.crossfade && self.fade_ms > 0 {
            if self.fade.is_active() {
                // Jump the in-flight fade to its end before starting the next
                self.frame.settle();
            }
            self.frame.next = next;
            self.fade.arm();
        } else {
            for (i, digit) in next.iter().enumerate() {
                if *digit != self.frame.next[i] {
                    self.frame.shown[i] = *digit;
                }
            }
            self.frame.next = next;
            if self.frame.is_settled() {
                self.fade.cancel();
            }
        }

        self.latch_pending = true;
    }

    /// Target digits (what the display is showing or fading toward)
    pub fn digits(&self) -> &[Digit] {
        self.frame.digits()
    }

    /// Digits on the outgoing side of any running crossfade
    pub fn shown(&self) -> &[Digit] {
        &self.frame.shown[..self.frame.width as usize]
    }

    pub fn is_blinking(&self) -> bool {
        self.blink != Blink::Idle
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_active()
    }

    /// Last drive the backend accepted
    pub fn drive(&self) -> Option<Drive> {
        self.drive
    }

    pub fn caps(&self) -> &BackendCaps {
        &self.caps
    }

    /// Backend failures since boot
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: DisplayBackend> DigitSink for DisplayDriver<B> {
    fn width(&self) -> u8 {
        self.frame.width
    }

    fn set_digits(&mut self, value: u32, start: u8, end: u8, leading_zeros: bool, fade: bool) {
        let mut next = self.frame.next;
        let width = self.frame.width as usize;
        write_value(&mut next[..width], value, start, end, leading_zeros);
        self.update(next, fade);
    }

    fn blank(&mut self, start: u8, end: u8, fade: bool) {
        let mut next = self.frame.next;
        let width = self.frame.width as usize;
        write_blank(&mut next[..width], start, end);
        self.update(next, fade);
    }

    fn display_blink(&mut self) {
        self.blink = Blink::Armed;
        self.apply_drive(Drive::Dark);
    }

    fn set_fade_duration(&mut self, ms: u32) {
        self.fade_ms = ms;
    }
}
