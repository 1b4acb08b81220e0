//! Output DAC collaborator trait
//!
//! The DAC driver itself is outside this core; the scheduler only needs
//! to hand it the bus at a fixed point in the tick sequence.

/// Output-voltage driver sharing the serial bus with the display.
pub trait DacDriver {
    /// Push the next output values onto the bus.
    ///
    /// Called once per tick, after the previous display transfer has been
    /// finalized and before the next page transfer starts.
    fn update(&mut self);
}
