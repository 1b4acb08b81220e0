//! Shared state between tasks
//!
//! The frame store and input state are shared through blocking mutexes:
//! the core tick task holds them for microseconds at a time, so async
//! mutexes would only add latency.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use quartet_core::display::DisplayFrameBuffer;
use quartet_drivers::triggers::EdgeFlags;

use crate::sampler::SampleRing;

/// CV input channels (RP2040 ADC capable pins: GPIO26-29)
pub const CV_CHANNELS: usize = 4;

/// Trigger input lines
pub const TRIGGER_LINES: usize = 4;

/// Sample ring depth in whole frames
pub const RING_FRAMES: usize = 16;

/// Double-buffered display frame store, shared by the core tick task
/// (drains), the render task (fills) and the capture task (snapshots).
pub static FRAME_BUFFER: Mutex<CriticalSectionRawMutex, RefCell<DisplayFrameBuffer>> =
    Mutex::new(RefCell::new(DisplayFrameBuffer::new()));

/// Edge/level store fed by the trigger input tasks.
pub static TRIGGER_FLAGS: EdgeFlags = EdgeFlags::new();

/// Sample ring fed by the acquisition task.
pub static SAMPLE_RING: SampleRing<CV_CHANNELS, RING_FRAMES> = SampleRing::new();

/// What the render task draws each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderState {
    pub ticks: u32,
    pub cv: [i32; CV_CHANNELS],
    pub trigger_intensity: [u8; TRIGGER_LINES],
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            cv: [0; CV_CHANNELS],
            trigger_intensity: [0; TRIGGER_LINES],
        }
    }
}

/// Latest per-tick input state, published by the core task.
pub static RENDER_STATE: Mutex<CriticalSectionRawMutex, Cell<RenderState>> =
    Mutex::new(Cell::new(RenderState::new()));
