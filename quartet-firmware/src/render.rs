//! Status frame rendering
//!
//! Minimal built-in view: one bar per CV channel plus a decaying block
//! per trigger input. Page layout is the display's native one: each byte
//! is an 8-pixel column slice.

use quartet_core::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FRAME_SIZE};

use crate::channels::{RenderState, CV_CHANNELS, TRIGGER_LINES};

/// Bar area height in pixels; the bottom row of pages is the trigger strip.
const BAR_HEIGHT: usize = DISPLAY_HEIGHT - 8;

/// Full-scale CV value for bar scaling (12-bit converter).
const CV_FULL_SCALE: i32 = 4096;

pub fn draw_status(frame: &mut [u8; FRAME_SIZE], state: &RenderState) {
    frame.fill(0);

    let lane = DISPLAY_WIDTH / CV_CHANNELS;
    for (channel, &value) in state.cv.iter().enumerate() {
        let height = (value.clamp(0, CV_FULL_SCALE) as usize * BAR_HEIGHT) / CV_FULL_SCALE as usize;
        let x0 = channel * lane + 4;
        draw_bar(frame, x0, lane - 8, height);
    }

    // Tick-driven activity marker in the top-right corner (~2 Hz blink).
    if (state.ticks >> 13) & 1 == 0 {
        frame[DISPLAY_WIDTH - 3] |= 0x03;
        frame[DISPLAY_WIDTH - 2] |= 0x03;
    }

    let strip = DISPLAY_WIDTH / TRIGGER_LINES;
    for (line, &intensity) in state.trigger_intensity.iter().enumerate() {
        // 4-bit intensity to 0..8 lit rows in the bottom page.
        let rows = (intensity as usize + 1) / 2;
        let mask = !(0xffu8.checked_shl(rows as u32).unwrap_or(0));
        let x0 = line * strip + 4;
        let page_base = (DISPLAY_HEIGHT / 8 - 1) * DISPLAY_WIDTH;
        for x in x0..x0 + strip - 8 {
            frame[page_base + x] = mask;
        }
    }
}

/// Vertical bar growing up from the bottom of the bar area.
fn draw_bar(frame: &mut [u8; FRAME_SIZE], x0: usize, width: usize, height: usize) {
    for y in 0..height.min(BAR_HEIGHT) {
        let row = BAR_HEIGHT - 1 - y;
        let page = row / 8;
        let bit = 1u8 << (row % 8);
        for x in x0..(x0 + width).min(DISPLAY_WIDTH) {
            frame[page * DISPLAY_WIDTH + x] |= bit;
        }
    }
}
