//! Rotary encoder edge watcher
//!
//! Decodes quadrature edges as they arrive so none are lost while the main
//! loop is busy multiplexing. The loop drains the count once per poll.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use portable_atomic::{AtomicI32, Ordering};

use horologe_drivers::input::{QuadratureDecoder, TransitionCounter};

/// Raw transitions not yet taken by the classifier
static TRANSITIONS: AtomicI32 = AtomicI32::new(0);

#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        let step = decoder.update(a.is_high(), b.is_high());
        if step != 0 {
            TRANSITIONS.fetch_add(step as i32, Ordering::Relaxed);
        }
    }
}

/// Reads the count accumulated by [`encoder_task`]
pub struct SharedTransitions;

impl TransitionCounter for SharedTransitions {
    fn take(&mut self) -> i32 {
        TRANSITIONS.swap(0, Ordering::Relaxed)
    }
}
