//! Paged display bus trait
//!
//! One hardware generation streams pages through a dedicated DMA channel,
//! the other through an interrupt-fed SPI FIFO. Both present the same
//! asynchronous contract here: `begin_page` queues one page and returns
//! immediately; completion is confirmed (and the bus released) on the
//! next tick's flush.

/// Page-addressing command for SH1106-class controllers.
///
/// Three bytes: upper column nibble, lower column nibble (carries the
/// persisted column offset correction) and the page select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageCommand {
    bytes: [u8; 3],
}

impl PageCommand {
    /// Default lower-column start for SH1106 modules (2-pixel panel offset).
    pub const DEFAULT_COLUMN_OFFSET: u8 = 0x02;

    /// Build the command for `page` with the given column offset correction.
    pub const fn new(page: u8, column_offset: u8) -> Self {
        Self {
            bytes: [0x10, column_offset & 0x0f, 0xb0 | (page & 0x0f)],
        }
    }

    /// Raw command bytes, ready for the bus.
    pub const fn bytes(&self) -> &[u8; 3] {
        &self.bytes
    }

    /// Page index encoded in this command.
    pub const fn page(&self) -> u8 {
        self.bytes[2] & 0x0f
    }
}

/// Paged transfer primitive over the shared serial bus.
///
/// The bus is shared with the DAC driver; ownership is time-division
/// multiplexed by the core scheduler's fixed step ordering, not by this
/// trait. An implementation may either queue the page for autonomous
/// transfer (and report completion via `transfer_complete`) or finish it
/// synchronously before `begin_page` returns, in which case it is never
/// observed busy.
pub trait PageBus {
    /// Queue one page: the 3-byte addressing command, then `data`.
    ///
    /// Must only be called when the bus is idle (after `finish()`).
    fn begin_page(&mut self, command: &PageCommand, data: &[u8]);

    /// True while a queued transfer has not been released via `finish()`.
    fn busy(&self) -> bool;

    /// True once the hardware has fully drained the queued transfer.
    fn transfer_complete(&self) -> bool;

    /// Release the bus after a completed transfer (chip-select update).
    fn finish(&mut self);
}
