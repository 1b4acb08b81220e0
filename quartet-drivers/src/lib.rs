//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in quartet-core for the module's peripherals:
//!
//! - SH1106 OLED over blocking SPI (synchronous page bus)
//! - Latched trigger inputs (software edge latch over GPIO)
//! - Staging wrapper deferring page transfers past critical sections

#![no_std]
#![deny(unsafe_code)]

pub mod sh1106;
pub mod staged;
pub mod triggers;
