//! Audible/visible alert trait

/// What started an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertSource {
    Alarm,
    Timer,
}

/// Signal output (buzzer, relay, light)
///
/// The core decides when to start and stop alerts; pattern generation
/// belongs to the implementation.
pub trait AlertSignal {
    fn is_sounding(&self) -> bool;

    /// Source of the current alert, if sounding
    fn source(&self) -> Option<AlertSource>;

    fn start(&mut self, source: AlertSource);

    fn stop(&mut self);

    /// Short acknowledgement chirp
    fn beep(&mut self) {}
}
