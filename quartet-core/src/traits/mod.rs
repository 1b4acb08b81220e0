//! Hardware capability traits
//!
//! These traits define the seams between the real-time core and the
//! hardware-specific implementations. The two supported hardware
//! generations differ in how the autonomous engines are built (dedicated
//! DMA vs. interrupt-fed FIFO); that choice is made at build configuration
//! time and never leaks through these interfaces.

pub mod bus;
pub mod dac;
pub mod sampler;
pub mod triggers;

pub use bus::{PageBus, PageCommand};
pub use dac::DacDriver;
pub use sampler::AutonomousSampler;
pub use triggers::TriggerLatch;
