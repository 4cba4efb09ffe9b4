//! Configuration types
//!
//! Board-agnostic configuration structures, loaded from `clock.toml` and
//! optionally stored as postcard-serialized binary data.

pub mod capabilities;
pub mod parse;
pub mod types;

pub use capabilities::*;
pub use parse::{parse_config, ParseError};
pub use types::*;
