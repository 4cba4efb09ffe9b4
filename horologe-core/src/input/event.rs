//! Classified input events

use crate::traits::Control;

/// How far a held control has progressed
///
/// Ordered: a hold only ever moves toward `Suppressed` before release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldTier {
    /// Pressed, no threshold reached yet
    #[default]
    None,
    Short,
    Long,
    VeryLong,
    SuperLong,
    /// The consumer stopped this hold; no further tiers, repeats or release
    Suppressed,
}

impl HoldTier {
    /// Tiers with a configured threshold, in increasing order
    pub const TIMED: [HoldTier; 4] = [
        HoldTier::Short,
        HoldTier::Long,
        HoldTier::VeryLong,
        HoldTier::SuperLong,
    ];

    /// Index into the configured thresholds, for timed tiers
    pub fn threshold_index(self) -> Option<usize> {
        match self {
            HoldTier::Short => Some(0),
            HoldTier::Long => Some(1),
            HoldTier::VeryLong => Some(2),
            HoldTier::SuperLong => Some(3),
            HoldTier::None | HoldTier::Suppressed => None,
        }
    }
}

/// What happened to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Control went down (or one rotary detent)
    Press,
    /// Control held past a tier threshold
    Hold(HoldTier),
    /// Control came up
    Release,
    /// Auto-repeat while an adjust control is held
    Repeat,
}

/// One classified input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlEvent {
    pub control: Control,
    pub kind: EventKind,
    /// Tier reached before this event (the tier at release for `Release`)
    pub previous: HoldTier,
    /// High-speed adjustment: fast repeat or fast rotary
    pub fast: bool,
}

impl ControlEvent {
    pub fn press(control: Control) -> Self {
        Self {
            control,
            kind: EventKind::Press,
            previous: HoldTier::None,
            fast: false,
        }
    }

    /// Press or repeat: both mean "adjust once" to a consumer
    pub fn is_press_like(&self) -> bool {
        matches!(self.kind, EventKind::Press | EventKind::Repeat)
    }

    /// Release without any hold tier reached
    pub fn is_bare_release(&self) -> bool {
        self.kind == EventKind::Release && self.previous == HoldTier::None
    }
}

/// Consumer verdict for the event just delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Keep classifying this hold
    Continue,
    /// Hold fully handled: suppress further tiers, repeats and the release
    Stop,
}
