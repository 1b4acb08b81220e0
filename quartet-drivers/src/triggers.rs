//! Latched trigger inputs
//!
//! Edges and levels are maintained in a shared atomic store by minimal
//! pin-change handlers (or edge-wait tasks that own the pins); the core
//! consumes the edge mask once per tick. The store lives in a `static`
//! so interrupt context can reach it without owning anything.
//!
//! Inputs are active low: a trigger pulls the line down, so a falling
//! edge is a clock and "level active" means the line reads low.

use portable_atomic::{AtomicU32, Ordering};
use quartet_core::digital::line_mask;
use quartet_core::traits::TriggerLatch;

/// Interrupt-safe edge and level store.
#[derive(Debug, Default)]
pub struct EdgeFlags {
    edges: AtomicU32,
    /// Bit set while the line is pulled low (active).
    levels: AtomicU32,
}

impl EdgeFlags {
    pub const fn new() -> Self {
        Self {
            edges: AtomicU32::new(0),
            levels: AtomicU32::new(0),
        }
    }

    /// Latch a falling edge on `line` and mark it active.
    /// Callable from interrupt context.
    pub fn edge(&self, line: usize) {
        self.edges.fetch_or(line_mask(line), Ordering::Release);
        self.levels.fetch_or(line_mask(line), Ordering::Release);
    }

    /// Track a level change without latching an edge (rising edges).
    pub fn set_level(&self, line: usize, active: bool) {
        if active {
            self.levels.fetch_or(line_mask(line), Ordering::Release);
        } else {
            self.levels.fetch_and(!line_mask(line), Ordering::Release);
        }
    }

    /// Read and clear all pending edges in one atomic step.
    pub fn take(&self) -> u32 {
        self.edges.swap(0, Ordering::AcqRel)
    }

    /// Whether `line` is currently active (pulled low).
    pub fn level(&self, line: usize) -> bool {
        self.levels.load(Ordering::Acquire) & line_mask(line) != 0
    }

    /// Classify an edge wake-up from the levels around it.
    ///
    /// `was_low` is the level recorded after the previous wake, `is_low`
    /// the level read after this one. The line is low, or it was high
    /// before the wake: either way a falling edge must have happened,
    /// even when the pulse already ended by the time the level was read.
    /// Only a bare release (low before, high after) carries no clock.
    pub fn wake(&self, line: usize, was_low: bool, is_low: bool) {
        if is_low || !was_low {
            self.edge(line);
        }
        self.set_level(line, is_low);
    }
}

/// Trigger-latch view over a shared [`EdgeFlags`] store.
pub struct LatchedInputs<const LINES: usize> {
    flags: &'static EdgeFlags,
}

impl<const LINES: usize> LatchedInputs<LINES> {
    pub fn new(flags: &'static EdgeFlags) -> Self {
        Self { flags }
    }
}

impl<const LINES: usize> TriggerLatch<LINES> for LatchedInputs<LINES> {
    fn take_edges(&mut self) -> u32 {
        self.flags.take()
    }

    fn level(&mut self, line: usize) -> bool {
        self.flags.level(line)
    }
}
