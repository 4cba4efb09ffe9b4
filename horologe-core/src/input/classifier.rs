//! Input classifier
//!
//! One global state machine, not one per control: at most one control is
//! owned at a time, and every other control is ignored until it is released.
//!
//! ```text
//! Idle ──press──▶ Owned(control) ──held past thresholds──▶ Hold(tier)…
//!   ▲                 │
//!   └────release──────┘   (Release suppressed after stop())
//! ```
//!
//! A debounce window follows every accepted press, release and rotary
//! detent. Hold tiers and repeats are timed from the press itself.

use crate::config::InputConfig;
use crate::time::{elapsed, has_elapsed, Millis};
use crate::traits::{Control, ControlSource};

use super::event::{ControlEvent, Disposition, EventKind, HoldTier};
use super::rotary::RotaryAccumulator;

/// The control currently being tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Owned {
    control: Control,
    pressed_at: Millis,
    tier: HoldTier,
    last_repeat: Millis,
}

pub struct InputClassifier {
    config: InputConfig,
    owner: Option<Owned>,
    last_accepted: Option<Millis>,
    rotary: RotaryAccumulator,
}

impl InputClassifier {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            config: *config,
            owner: None,
            last_accepted: None,
            rotary: RotaryAccumulator::new(config.rotary_fast_ms, config.rotary_slow_ms),
        }
    }

    /// Take ownership of a control already held at power-on
    ///
    /// No `Press` is emitted; the hold then escalates and releases normally.
    pub fn claim_held_at_boot<S>(&mut self, now: Millis, source: &mut S) -> Option<Control>
    where
        S: ControlSource + ?Sized,
    {
        let control = Control::ALL
            .into_iter()
            .find(|c| source.is_pressed(*c).unwrap_or(false))?;
        info!("Control held at boot: {}", control);
        self.owner = Some(Owned {
            control,
            pressed_at: now,
            tier: HoldTier::None,
            last_repeat: now,
        });
        self.last_accepted = Some(now);
        Some(control)
    }

    /// Classify the current control state, delivering events to `handler`
    ///
    /// The handler's [`Disposition`] is honored immediately: returning
    /// `Stop` prevents any later tier of the same poll from firing.
    pub fn poll<S, F>(&mut self, now: Millis, source: &mut S, mut handler: F)
    where
        S: ControlSource + ?Sized,
        F: FnMut(ControlEvent) -> Disposition,
    {
        self.poll_rotary(now, source, &mut handler);

        if let Some(last) = self.last_accepted {
            if !has_elapsed(now, last, self.config.debounce_ms) {
                return;
            }
        }

        match self.owner {
            None => self.poll_idle(now, source, &mut handler),
            Some(owned) => self.poll_owned(now, owned, source, &mut handler),
        }
    }

    fn poll_rotary<S, F>(&mut self, now: Millis, source: &mut S, handler: &mut F)
    where
        S: ControlSource + ?Sized,
        F: FnMut(ControlEvent) -> Disposition,
    {
        let detents = self.rotary.accumulate(now, source.take_transitions());
        if detents.count == 0 {
            return;
        }

        if self.owner.is_some() {
            debug!("Dropping {} detents while a control is held", detents.count);
            self.rotary.discard();
            return;
        }

        let control = if detents.count > 0 {
            Control::Up
        } else {
            Control::Down
        };
        for _ in 0..detents.count.unsigned_abs() {
            handler(ControlEvent {
                fast: detents.fast,
                ..ControlEvent::press(control)
            });
        }
        self.last_accepted = Some(now);
    }

    fn poll_idle<S, F>(&mut self, now: Millis, source: &mut S, handler: &mut F)
    where
        S: ControlSource + ?Sized,
        F: FnMut(ControlEvent) -> Disposition,
    {
        for control in Control::ALL {
            match source.is_pressed(control) {
                Ok(true) => {
                    let mut owned = Owned {
                        control,
                        pressed_at: now,
                        tier: HoldTier::None,
                        last_repeat: now,
                    };
                    self.last_accepted = Some(now);
                    if handler(ControlEvent::press(control)) == Disposition::Stop {
                        owned.tier = HoldTier::Suppressed;
                    }
                    self.owner = Some(owned);
                    return;
                }
                Ok(false) => {}
                Err(e) => debug!("Read of {} failed: {}", control, e),
            }
        }
    }

    fn poll_owned<S, F>(&mut self, now: Millis, mut owned: Owned, source: &mut S, handler: &mut F)
    where
        S: ControlSource + ?Sized,
        F: FnMut(ControlEvent) -> Disposition,
    {
        // A failed read counts as released so a broken line cannot hold ownership
        if !source.is_pressed(owned.control).unwrap_or(false) {
            self.owner = None;
            self.last_accepted = Some(now);
            if owned.tier != HoldTier::Suppressed {
                handler(ControlEvent {
                    control: owned.control,
                    kind: EventKind::Release,
                    previous: owned.tier,
                    fast: false,
                });
            }
            return;
        }

        if owned.tier == HoldTier::Suppressed {
            return;
        }

        let held = elapsed(now, owned.pressed_at);
        for tier in HoldTier::TIMED {
            if tier <= owned.tier {
                continue;
            }
            let Some(index) = tier.threshold_index() else {
                continue;
            };
            if held < self.config.hold_ms[index] {
                break;
            }

            let event = ControlEvent {
                control: owned.control,
                kind: EventKind::Hold(tier),
                previous: owned.tier,
                fast: false,
            };
            owned.tier = tier;
            owned.last_repeat = now;
            if handler(event) == Disposition::Stop {
                owned.tier = HoldTier::Suppressed;
                self.owner = Some(owned);
                return;
            }
        }

        if owned.control.is_adjust() && owned.tier >= HoldTier::Short {
            let interval = if owned.tier >= HoldTier::Long {
                self.config.repeat_fast_ms
            } else {
                self.config.repeat_slow_ms
            };
            if has_elapsed(now, owned.last_repeat, interval) {
                owned.last_repeat = now;
                let event = ControlEvent {
                    control: owned.control,
                    kind: EventKind::Repeat,
                    previous: owned.tier,
                    fast: owned.tier >= HoldTier::VeryLong,
                };
                if handler(event) == Disposition::Stop {
                    owned.tier = HoldTier::Suppressed;
                }
            }
        }

        self.owner = Some(owned);
    }

    /// Mark the current hold as fully handled
    ///
    /// Further tiers, repeats and the eventual release of the owned control
    /// are suppressed. No effect when idle.
    pub fn stop(&mut self) {
        if let Some(owned) = self.owner.as_mut() {
            owned.tier = HoldTier::Suppressed;
        }
    }

    pub fn is_idle(&self) -> bool {
        self.owner.is_none()
    }

    /// Control currently owned, if any
    pub fn owned(&self) -> Option<Control> {
        self.owner.map(|o| o.control)
    }

    /// Tier reached by the owned control
    pub fn tier(&self) -> Option<HoldTier> {
        self.owner.map(|o| o.tier)
    }
}
