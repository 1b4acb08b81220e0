//! Autonomous CV sampling over a shared frame ring
//!
//! The acquisition task free-runs the ADC round robin and deposits whole
//! frames here; the core tick task harvests them through the
//! [`AutonomousSampler`] seam. Single producer, single consumer, no
//! locking: the write position is only advanced after a frame's samples
//! are stored.

use portable_atomic::{AtomicU16, AtomicU32, Ordering};
use quartet_core::traits::AutonomousSampler;

/// Lock-free ring of whole converter frames.
pub struct SampleRing<const CHANNELS: usize, const FRAMES: usize> {
    frames: [[AtomicU16; CHANNELS]; FRAMES],
    write_pos: AtomicU32,
}

impl<const CHANNELS: usize, const FRAMES: usize> SampleRing<CHANNELS, FRAMES> {
    pub const fn new() -> Self {
        // Array-repeat of a const sidesteps the non-Copy restriction.
        #[allow(clippy::declare_interior_mutable_const)]
        const SAMPLE: AtomicU16 = AtomicU16::new(0);
        Self {
            frames: [const { [SAMPLE; CHANNELS] }; FRAMES],
            write_pos: AtomicU32::new(0),
        }
    }

    /// Deposit one frame and advance the write position.
    /// Producer side only.
    pub fn push(&self, frame: [u16; CHANNELS]) {
        let pos = self.write_pos.load(Ordering::Relaxed);
        let slot = &self.frames[pos as usize % FRAMES];
        for (cell, sample) in slot.iter().zip(frame.iter()) {
            cell.store(*sample, Ordering::Relaxed);
        }
        self.write_pos.store(pos.wrapping_add(1), Ordering::Release);
    }

    fn write_pos(&self) -> u32 {
        self.write_pos.load(Ordering::Acquire)
    }

    fn frame(&self, pos: u32) -> [u16; CHANNELS] {
        let slot = &self.frames[pos as usize % FRAMES];
        let mut frame = [0u16; CHANNELS];
        for (sample, cell) in frame.iter_mut().zip(slot.iter()) {
            *sample = cell.load(Ordering::Relaxed);
        }
        frame
    }
}

/// [`AutonomousSampler`] view over a static [`SampleRing`].
pub struct RingSampler<const CHANNELS: usize, const FRAMES: usize> {
    ring: &'static SampleRing<CHANNELS, FRAMES>,
}

impl<const CHANNELS: usize, const FRAMES: usize> RingSampler<CHANNELS, FRAMES> {
    pub fn new(ring: &'static SampleRing<CHANNELS, FRAMES>) -> Self {
        Self { ring }
    }
}

impl<const CHANNELS: usize, const FRAMES: usize> AutonomousSampler<CHANNELS>
    for RingSampler<CHANNELS, FRAMES>
{
    // The acquisition task free-runs from boot; nothing to kick here.
    fn start(&mut self) {}

    fn capacity(&self) -> u32 {
        FRAMES as u32
    }

    fn write_pos(&self) -> u32 {
        self.ring.write_pos()
    }

    fn frame(&self, pos: u32) -> [u16; CHANNELS] {
        self.ring.frame(pos)
    }
}
