//! Staged page transfers
//!
//! When the core tick runs inside a critical section (shared frame
//! store), a blocking bus transfer in `begin_page` would hold interrupts
//! off for the whole page. [`StagedBus`] splits the two: `begin_page`
//! only copies the page into a staging slot, and [`StagedBus::transmit`]
//! pushes it to the real bus afterwards, outside the critical section.

use quartet_core::display::PAGE_SIZE;
use quartet_core::traits::{PageBus, PageCommand};

/// One-slot staging wrapper around a page bus.
pub struct StagedBus<B> {
    inner: B,
    pending: Option<(PageCommand, [u8; PAGE_SIZE], usize)>,
}

impl<B: PageBus> StagedBus<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    /// Send the staged page to the inner bus, if one is waiting.
    ///
    /// Call after the tick's critical section ends. While a page stays
    /// staged the bus reports busy, so a skipped transmit shows up as a
    /// bounded flush wait rather than a lost page.
    pub fn transmit(&mut self) {
        if let Some((command, page, len)) = self.pending.take() {
            self.inner.begin_page(&command, &page[..len]);
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }
}

impl<B: PageBus> PageBus for StagedBus<B> {
    fn begin_page(&mut self, command: &PageCommand, data: &[u8]) {
        let mut page = [0u8; PAGE_SIZE];
        let len = data.len().min(PAGE_SIZE);
        page[..len].copy_from_slice(&data[..len]);
        self.pending = Some((*command, page, len));
    }

    fn busy(&self) -> bool {
        self.pending.is_some() || self.inner.busy()
    }

    fn transfer_complete(&self) -> bool {
        self.pending.is_none() && self.inner.transfer_complete()
    }

    fn finish(&mut self) {
        self.inner.finish()
    }
}
