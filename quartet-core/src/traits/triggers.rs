//! Trigger input latch trait
//!
//! Edge detection happens asynchronously to the core tick: either a
//! hardware edge-sensitive latch per line, or a minimal pin-change ISR
//! that only sets a flag. The core consumes the latches once per tick.

/// Per-line sticky edge latches plus instantaneous level access.
pub trait TriggerLatch<const LINES: usize> {
    /// Read and clear all edge latches in one atomic step.
    ///
    /// Bit `i` set means line `i` saw an edge since the previous call.
    /// The read-clear must be atomic (or run with interrupts masked) so
    /// an edge arriving mid-read is deferred to the next call rather
    /// than lost.
    fn take_edges(&mut self) -> u32;

    /// Instantaneous line level, bypassing the latch.
    ///
    /// Active-low convention: returns `true` when the line is
    /// electrically low (gate present).
    fn level(&mut self, line: usize) -> bool;
}
