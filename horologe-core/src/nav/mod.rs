//! Navigation
//!
//! Which function is shown, what is being edited, and the settings menu.

pub mod field;
pub mod function;
pub mod machine;
pub mod render;
pub mod settings;
pub mod timer;

pub use field::{Bound, EditSession, EditTarget, FieldSpec};
pub use function::ClockFunction;
pub use machine::{Io, NavState, NavigationStateMachine};
pub use settings::{enabled_options, OptionList};
pub use timer::{Direction, Timer, TimerRunoutPolicy};
