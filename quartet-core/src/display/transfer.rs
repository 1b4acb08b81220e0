//! Paged display transfer engine
//!
//! Streams one completed frame to the display controller in fixed-size
//! pages, one page per core tick, over the shared serial bus. The bus
//! primitive (DMA-fed or interrupt-fed FIFO) is behind [`PageBus`]; this
//! engine owns the page sequencing and frame hand-off.

use super::framebuffer::FrameBuffer;
use super::{FRAME_SIZE, NUM_PAGES, PAGE_SIZE};
use crate::traits::{PageBus, PageCommand};

/// Default bound on the completion busy-wait in `flush()`.
///
/// The previous page transfer normally completes well within one tick;
/// the wait only spins when application processing overran the frame
/// budget. Exceeding the bound forces the bus release anyway - the known
/// failure mode is a display glitch, not a recovery path.
pub const DEFAULT_FLUSH_SPIN_LIMIT: u32 = 100_000;

/// Per-tick paged transfer of readable frames to the display.
pub struct PagedDisplay<B: PageBus> {
    bus: B,
    column_offset: u8,
    /// Next page to send within the current frame.
    page: u8,
    in_frame: bool,
    flush_spin_limit: u32,
}

impl<B: PageBus> PagedDisplay<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            column_offset: PageCommand::DEFAULT_COLUMN_OFFSET,
            page: 0,
            in_frame: false,
            flush_spin_limit: DEFAULT_FLUSH_SPIN_LIMIT,
        }
    }

    /// Install the persisted column offset and reset page state.
    pub fn init(&mut self, column_offset: u8) {
        self.column_offset = column_offset;
        self.page = 0;
        self.in_frame = false;
    }

    /// Single-byte display-controller addressing correction, replayed
    /// from the persisted configuration.
    pub fn adjust_offset(&mut self, column_offset: u8) {
        self.column_offset = column_offset;
    }

    /// Bound the completion busy-wait (spin iterations, not time).
    pub fn set_flush_spin_limit(&mut self, limit: u32) {
        self.flush_spin_limit = limit;
    }

    /// Finalize the previous page transfer and release the bus.
    ///
    /// First step of every tick. Busy-waits for transfer completion up to
    /// the configured bound - a deliberate latency/robustness trade-off:
    /// releasing the bus early would corrupt the in-flight page, and the
    /// DAC update that follows needs the bus.
    pub fn flush(&mut self) {
        if !self.bus.busy() {
            return;
        }
        let mut spins = 0u32;
        while !self.bus.transfer_complete() {
            spins += 1;
            if spins >= self.flush_spin_limit {
                break;
            }
        }
        self.bus.finish();
    }

    /// Start the next page transfer, if there is anything to send.
    ///
    /// Sends exactly one page per call. After the final page of a frame
    /// is queued, the frame slot is released back to the writer.
    pub fn update<const FRAMES: usize>(&mut self, fb: &mut FrameBuffer<FRAME_SIZE, FRAMES>) {
        if !self.in_frame {
            if fb.readable() == 0 {
                return;
            }
            self.in_frame = true;
            self.page = 0;
        }

        let command = PageCommand::new(self.page, self.column_offset);
        let start = self.page as usize * PAGE_SIZE;
        let frame = fb.readable_frame();
        self.bus.begin_page(&command, &frame[start..start + PAGE_SIZE]);

        self.page += 1;
        if self.page as usize == NUM_PAGES {
            fb.read();
            self.in_frame = false;
        }
    }

    /// Whether a frame transfer is in progress.
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
