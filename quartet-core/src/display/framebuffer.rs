//! Multi-slot frame store
//!
//! Single-writer/single-reader ring of whole frames. The cursors are
//! monotonically increasing and wrap via unsigned overflow instead of a
//! modulo-with-sentinel scheme, so a new frame can be written while the
//! old one is still being transferred: `readable = write - read`,
//! `writeable = slots - readable`, both correct across the wrap.
//!
//! One extra slot serves the screen-capture side channel: a capture
//! request snapshots the *next* completed frame, never a partially
//! written one.

/// Fixed-capacity frame ring with a capture slot.
pub struct FrameBuffer<const FRAME_SIZE: usize, const FRAMES: usize> {
    frames: [[u8; FRAME_SIZE]; FRAMES],
    capture: [u8; FRAME_SIZE],
    write_ptr: u32,
    read_ptr: u32,
    capture_armed: bool,
    capture_valid: bool,
}

impl<const FRAME_SIZE: usize, const FRAMES: usize> FrameBuffer<FRAME_SIZE, FRAMES> {
    pub const fn new() -> Self {
        Self {
            frames: [[0; FRAME_SIZE]; FRAMES],
            capture: [0; FRAME_SIZE],
            write_ptr: 0,
            read_ptr: 0,
            capture_armed: false,
            capture_valid: false,
        }
    }

    /// Completed frames waiting to be transferred.
    pub fn readable(&self) -> u32 {
        self.write_ptr.wrapping_sub(self.read_ptr)
    }

    /// Slots available to the writer.
    pub fn writeable(&self) -> u32 {
        FRAMES as u32 - self.readable()
    }

    /// Next slot to render into. Valid only when `writeable() > 0`;
    /// the returned reference must not be retained across `written()`.
    pub fn writeable_frame(&mut self) -> &mut [u8; FRAME_SIZE] {
        debug_assert!(self.writeable() > 0);
        &mut self.frames[self.write_ptr as usize % FRAMES]
    }

    /// Commit the frame returned by `writeable_frame()`.
    ///
    /// If a capture was requested, the just-completed frame is snapshotted
    /// into the capture slot before the cursor advances.
    pub fn written(&mut self) {
        debug_assert!(self.writeable() > 0);
        if self.capture_armed {
            self.capture_armed = false;
            self.capture
                .copy_from_slice(&self.frames[self.write_ptr as usize % FRAMES]);
            self.capture_valid = true;
        }
        self.write_ptr = self.write_ptr.wrapping_add(1);
    }

    /// Frame currently being drained. Valid only when `readable() > 0`.
    pub fn readable_frame(&self) -> &[u8; FRAME_SIZE] {
        debug_assert!(self.readable() > 0);
        &self.frames[self.read_ptr as usize % FRAMES]
    }

    /// Release the frame returned by `readable_frame()`.
    pub fn read(&mut self) {
        debug_assert!(self.readable() > 0);
        self.read_ptr = self.read_ptr.wrapping_add(1);
    }

    /// Arm the capture slot: the next completed frame is snapshotted.
    pub fn capture_request(&mut self) {
        self.capture_armed = true;
    }

    /// Captured frame, once one is available.
    pub fn captured(&self) -> Option<&[u8; FRAME_SIZE]> {
        if self.capture_valid {
            Some(&self.capture)
        } else {
            None
        }
    }

    /// Release the capture slot for the next request.
    pub fn capture_retire(&mut self) {
        self.capture_valid = false;
    }

    /// Construct with cursors at an arbitrary point, to exercise the
    /// unsigned wrap in tests.
    #[cfg(test)]
    fn with_cursors(write_ptr: u32, read_ptr: u32) -> Self {
        let mut fb = Self::new();
        fb.write_ptr = write_ptr;
        fb.read_ptr = read_ptr;
        fb
    }
}

impl<const FRAME_SIZE: usize, const FRAMES: usize> Default for FrameBuffer<FRAME_SIZE, FRAMES> {
    fn default() -> Self {
        Self::new()
    }
}
