//! Render task
//!
//! Fills writeable frame slots with the status view. Runs well below the
//! tick rate; the double-buffered frame store means a frame can be built
//! while the previous one is still going out page by page.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::{FRAME_BUFFER, RENDER_STATE};
use crate::render::draw_status;

/// Frame build interval (~30 fps)
const RENDER_INTERVAL_MS: u64 = 33;

#[embassy_executor::task]
pub async fn render_task() {
    info!("render task started");

    let mut ticker = Ticker::every(Duration::from_millis(RENDER_INTERVAL_MS));
    loop {
        ticker.next().await;
        let state = RENDER_STATE.lock(|s| s.get());
        FRAME_BUFFER.lock(|fb| {
            let mut fb = fb.borrow_mut();
            if fb.writeable() == 0 {
                // Transfer backlog; skip this frame rather than block.
                return;
            }
            draw_status(fb.writeable_frame(), &state);
            fb.written();
        });
    }
}
