//! Paged display pipeline
//!
//! A multi-buffered frame store lets the rendering layer build the next
//! frame while the previous one is still being drained, one page per core
//! tick, by the asynchronous bus transfer engine.

pub mod framebuffer;
pub mod transfer;

pub use framebuffer::FrameBuffer;
pub use transfer::{PagedDisplay, DEFAULT_FLUSH_SPIN_LIMIT};

/// Display width in pixels
pub const DISPLAY_WIDTH: usize = 128;
/// Display height in pixels
pub const DISPLAY_HEIGHT: usize = 64;
/// Pages per frame (8 pixel rows each)
pub const NUM_PAGES: usize = DISPLAY_HEIGHT / 8;
/// Bytes per page
pub const PAGE_SIZE: usize = DISPLAY_WIDTH;
/// Bytes per full frame
pub const FRAME_SIZE: usize = PAGE_SIZE * NUM_PAGES;
/// Frame slots (double buffering)
pub const FRAME_COUNT: usize = 2;

/// The frame store for the standard 128x64 build
pub type DisplayFrameBuffer = FrameBuffer<FRAME_SIZE, FRAME_COUNT>;
