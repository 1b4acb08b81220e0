//! Digital trigger/clock input capture
//!
//! Edges are latched asynchronously (hardware latch or minimal pin-change
//! ISR); `scan()` consumes the latches once per tick and republishes them
//! as a bitmask that stays stable until the next scan. An edge is visible
//! in exactly one scan, even when edges are faster than the scan cadence.

use crate::scheduler::TICK_FREQ;
use crate::traits::TriggerLatch;

/// Bitmask for a single input line
pub const fn line_mask(line: usize) -> u32 {
    1 << line
}

/// Per-tick view over the hardware edge latches.
pub struct DigitalInputs<T, const LINES: usize> {
    latch: T,
    clocked_mask: u32,
}

impl<T, const LINES: usize> DigitalInputs<T, LINES>
where
    T: TriggerLatch<LINES>,
{
    pub fn new(latch: T) -> Self {
        Self {
            latch,
            clocked_mask: 0,
        }
    }

    /// Consume all pending edge latches into this tick's clocked mask.
    pub fn scan(&mut self) {
        self.clocked_mask = self.latch.take_edges() & ((1 << LINES) - 1);
    }

    /// Mask of all lines clocked since the last `scan()` (non-destructive).
    pub fn clocked(&self) -> u32 {
        self.clocked_mask
    }

    /// Whether `line` was clocked since the last `scan()` (non-destructive).
    pub fn clocked_line(&self, line: usize) -> bool {
        self.clocked_mask & line_mask(line) != 0
    }

    /// Instantaneous line level, bypassing the latch (active low).
    pub fn read_immediate(&mut self, line: usize) -> bool {
        self.latch.level(line)
    }

    pub fn latch(&self) -> &T {
        &self.latch
    }

    pub fn latch_mut(&mut self) -> &mut T {
        &mut self.latch
    }
}

/// Helper for visualizing digital inputs with decay
///
/// A fresh edge resets the phase accumulator to maximum; it then decays
/// linearly to zero over an eighth of a second. Uses the top 4 bits as
/// the displayed intensity. UI feedback only, not on the critical path.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputDisplay {
    phase: u32,
}

impl InputDisplay {
    /// Decay window in core ticks
    pub const DISPLAY_TIME: u32 = TICK_FREQ / 8;
    const PHASE_INC: u32 = (0xf << 28) / Self::DISPLAY_TIME;

    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    /// Advance by `ticks`; `clocked` restarts the decay from maximum.
    pub fn update(&mut self, ticks: u32, clocked: bool) {
        if clocked {
            self.phase = u32::MAX;
        } else {
            let phase_inc = ticks.saturating_mul(Self::PHASE_INC);
            self.phase = self.phase.saturating_sub(phase_inc);
        }
    }

    /// Current intensity, 0 (dark) to 15 (just clocked).
    pub fn intensity(&self) -> u8 {
        (self.phase >> 28) as u8
    }
}
