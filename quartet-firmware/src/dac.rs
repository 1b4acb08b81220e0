//! DAC collaborator slot
//!
//! The converter driver is an external collaborator behind the
//! [`DacDriver`] seam; the core tick only guarantees it the bus window
//! right after the display flush. Boards without an output stage run the
//! idle implementation.

use quartet_core::traits::DacDriver;

/// No output stage fitted.
pub struct IdleDac;

impl DacDriver for IdleDac {
    fn update(&mut self) {}
}
