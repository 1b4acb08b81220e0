//! Autonomous analog sampler trait
//!
//! The sampling engine runs independently of the core tick: hardware
//! cycles through all CV channels in round-robin and deposits complete
//! N-channel frames into a circular buffer, re-arming itself on
//! completion. The core only ever harvests at a bounded rate.

/// Autonomous multiplexed sampling engine with a circular frame store.
///
/// A *frame* is one sample per channel, at full converter resolution
/// (implementations scale up lower-resolution converters). The write
/// position is owned by the hardware; the consumer tracks its own read
/// position and must never pass the write position.
pub trait AutonomousSampler<const CHANNELS: usize> {
    /// Start (or restart) continuous sampling.
    fn start(&mut self);

    /// Ring capacity in whole frames.
    fn capacity(&self) -> u32;

    /// Total frames deposited since `start()`, monotonically increasing.
    ///
    /// Wraps via unsigned overflow; consumers compute deltas with
    /// wrapping subtraction. Frames older than `capacity()` positions
    /// behind this value have been overwritten.
    fn write_pos(&self) -> u32;

    /// Copy of the frame stored at `pos % capacity()`.
    fn frame(&self, pos: u32) -> [u16; CHANNELS];
}
