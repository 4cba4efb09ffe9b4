//! Display backends

pub mod ht16k33;
pub mod max7219;
pub mod nixie;

pub use ht16k33::Ht16k33;
pub use max7219::Max7219;
pub use nixie::NixieMultiplexer;
