//! Async tasks

mod encoder;

pub use encoder::{encoder_task, SharedTransitions};
