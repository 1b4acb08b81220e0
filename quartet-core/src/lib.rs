//! Board-agnostic real-time I/O core for the Quartet module
//!
//! This crate contains all time-critical logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware capability traits (autonomous sampler, paged bus, triggers, DAC)
//! - CV acquisition (per-tick harvest, calibration, smoothing)
//! - Digital input edge capture and decay visualization
//! - Multi-buffered frame store and paged display transfer engine
//! - Screen-capture side channel
//! - The fixed-rate core tick sequencer
//!
//! The two autonomous DMA engines (analog sampling, display page transfer)
//! live behind traits; one implementation per supported hardware generation
//! is selected at build configuration time.

#![no_std]
#![deny(unsafe_code)]

pub mod acquisition;
pub mod capture;
pub mod config;
pub mod digital;
pub mod display;
pub mod scheduler;
pub mod traits;
