//! Configuration types
//!
//! Board-agnostic calibration and settings structures, stored as postcard
//! binary data by the persistence layer.

pub mod calibration;

pub use calibration::*;
