//! Embassy async tasks
//!
//! Each task runs independently; shared state lives in `channels`.

pub mod capture;
pub mod core;
pub mod render;
pub mod sampler;
pub mod triggers;

pub use capture::capture_task;
pub use core::{core_task, Scheduler};
pub use render::render_task;
pub use sampler::sampler_task;
pub use triggers::trigger_task;
