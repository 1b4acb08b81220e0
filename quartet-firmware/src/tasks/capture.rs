//! Screen-capture drain task
//!
//! Any byte received on the capture UART arms a snapshot of the next
//! completed frame; the frame is then streamed back as paced hex chunks
//! so the drain never contends with the tick for long.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Timer;
use embedded_io_async::{Read, Write};

use quartet_core::capture::{ScreenCapture, CAPTURE_CHUNK_INTERVAL_US};

use crate::channels::FRAME_BUFFER;

#[embassy_executor::task]
pub async fn capture_task(mut rx: BufferedUartRx, mut tx: BufferedUartTx) {
    info!("capture task started");

    let mut capture = ScreenCapture::new();
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(n) if n > 0 => {}
            _ => continue,
        }
        trace!("capture requested");
        FRAME_BUFFER.lock(|fb| capture.request(&mut fb.borrow_mut()));

        // Drain the snapshot one paced chunk at a time; the final chunk
        // carries the CRLF terminator.
        loop {
            Timer::after_micros(CAPTURE_CHUNK_INTERVAL_US as u64).await;
            let chunk = FRAME_BUFFER.lock(|fb| capture.drain_chunk(&mut fb.borrow_mut()));
            let Some(chunk) = chunk else {
                // Snapshot not taken yet (no frame completed since the
                // request); keep waiting.
                continue;
            };
            if tx.write_all(&chunk).await.is_err() {
                warn!("capture UART write failed");
                break;
            }
            if chunk.ends_with(b"\r\n") {
                break;
            }
        }
    }
}
