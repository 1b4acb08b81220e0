//! Trigger input tasks
//!
//! One task per line. A falling edge (active low) latches a clock into
//! the shared flag store; level changes keep the instantaneous-level
//! mask current. The core consumes the latches once per tick.
//!
//! The level is polled after the wake, so a short pulse can already be
//! over by then. Classification therefore goes through
//! [`EdgeFlags::wake`](quartet_drivers::triggers::EdgeFlags::wake) with
//! the level from the previous wake: any wake that is not a bare
//! release carries a falling edge and latches the clock.

use embassy_rp::gpio::Input;

use crate::channels::TRIGGER_FLAGS;

#[embassy_executor::task(pool_size = 4)]
pub async fn trigger_task(mut pin: Input<'static>, line: usize) {
    let mut was_low = pin.is_low();
    TRIGGER_FLAGS.set_level(line, was_low);
    loop {
        pin.wait_for_any_edge().await;
        let is_low = pin.is_low();
        TRIGGER_FLAGS.wake(line, was_low, is_low);
        was_low = is_low;
    }
}
