//! Control line traits

/// Physical controls the core knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Primary control: cycle functions, enter editing, confirm
    Select,
    /// Optional preset control
    Alt,
    /// Adjust up
    Up,
    /// Adjust down
    Down,
}

impl Control {
    /// Scan order used when looking for a new press
    pub const ALL: [Control; 4] = [Control::Select, Control::Alt, Control::Up, Control::Down];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Up and Down auto-repeat while held
    pub fn is_adjust(self) -> bool {
        matches!(self, Control::Up | Control::Down)
    }
}

/// Errors from reading control hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Pin or ADC read failed
    ReadFailed,
}

/// Raw control-line reader
pub trait ControlSource {
    /// Current level of a control line
    ///
    /// Controls that are not fitted report `Ok(false)`.
    fn is_pressed(&mut self, control: Control) -> Result<bool, InputError>;

    /// Signed raw quadrature transitions since the previous call
    ///
    /// Positive values turn toward Up. Sources without a rotary return 0.
    fn take_transitions(&mut self) -> i32 {
        0
    }
}
