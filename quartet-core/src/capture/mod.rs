//! Screen-capture side channel
//!
//! A host sends a single byte over the serial link to request a capture;
//! the next completed frame is snapshotted verbatim into the frame
//! store's capture slot and drained back as two-hex-digit bytes in small
//! chunks. The caller paces the chunks (one per ~1 ms) so the drain never
//! competes with real-time work; the final chunk is terminated by CRLF.

use crate::display::FrameBuffer;

/// Source bytes encoded per drain chunk
pub const CAPTURE_CHUNK_SIZE: usize = 32;

/// Suggested pacing between chunks, in microseconds
pub const CAPTURE_CHUNK_INTERVAL_US: u32 = 950;

/// Output capacity of one chunk: two hex digits per byte plus CRLF
pub const CAPTURE_CHUNK_LEN: usize = CAPTURE_CHUNK_SIZE * 2 + 2;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Rate-limited hex drain over the frame store's capture slot.
#[derive(Debug, Default)]
pub struct ScreenCapture {
    index: usize,
}

impl ScreenCapture {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Arm a new capture; any partially drained frame is abandoned.
    pub fn request<const FS: usize, const FR: usize>(&mut self, fb: &mut FrameBuffer<FS, FR>) {
        fb.capture_request();
        self.index = 0;
    }

    /// Encode the next chunk of the captured frame.
    ///
    /// Returns `None` while no captured frame is available. On the chunk
    /// that exhausts the frame, appends CRLF and retires the capture slot.
    pub fn drain_chunk<const FS: usize, const FR: usize>(
        &mut self,
        fb: &mut FrameBuffer<FS, FR>,
    ) -> Option<heapless::Vec<u8, CAPTURE_CHUNK_LEN>> {
        let (out, finished) = {
            let data = fb.captured()?;
            let mut out = heapless::Vec::new();
            let mut finished = false;
            for _ in 0..CAPTURE_CHUNK_SIZE {
                let byte = data[self.index];
                let _ = out.push(HEX_DIGITS[(byte >> 4) as usize]);
                let _ = out.push(HEX_DIGITS[(byte & 0x0f) as usize]);
                self.index += 1;
                if self.index >= FS {
                    let _ = out.extend_from_slice(b"\r\n");
                    finished = true;
                    break;
                }
            }
            (out, finished)
        };

        if finished {
            fb.capture_retire();
            self.index = 0;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBuffer = FrameBuffer<64, 2>;

    fn captured_buffer() -> TestBuffer {
        let mut fb = TestBuffer::new();
        fb.capture_request();
        let frame = fb.writeable_frame();
        for (i, byte) in frame.iter_mut().enumerate() {
            *byte = i as u8;
        }
        fb.written();
        fb
    }

    #[test]
    fn test_no_chunk_without_capture() {
        let mut fb = TestBuffer::new();
        let mut capture = ScreenCapture::new();
        assert!(capture.drain_chunk(&mut fb).is_none());
    }

    #[test]
    fn test_drain_chunks_and_terminator() {
        let mut fb = captured_buffer();
        let mut capture = ScreenCapture::new();

        // 64-byte frame = two 32-byte chunks; CRLF only on the last.
        let first = capture.drain_chunk(&mut fb).unwrap();
        assert_eq!(first.len(), CAPTURE_CHUNK_SIZE * 2);
        assert_eq!(&first[..4], b"0001");
        assert_eq!(&first[62..64], b"1F");

        let second = capture.drain_chunk(&mut fb).unwrap();
        assert_eq!(second.len(), CAPTURE_CHUNK_SIZE * 2 + 2);
        assert_eq!(&second[..2], b"20");
        assert_eq!(&second[second.len() - 2..], b"\r\n");

        // Capture retired; nothing further until the next request.
        assert!(capture.drain_chunk(&mut fb).is_none());
        assert!(fb.captured().is_none());
    }

    #[test]
    fn test_request_restarts_drain() {
        let mut fb = captured_buffer();
        let mut capture = ScreenCapture::new();

        let _ = capture.drain_chunk(&mut fb).unwrap();

        // New request mid-drain: index resets, next captured frame
        // drains from the top.
        capture.request(&mut fb);
        let frame = fb.writeable_frame();
        frame.fill(0xAA);
        fb.written();

        let chunk = capture.drain_chunk(&mut fb).unwrap();
        assert_eq!(&chunk[..2], b"AA");
    }

    #[test]
    fn test_hex_encoding_is_two_uppercase_digits() {
        let mut fb = TestBuffer::new();
        fb.capture_request();
        fb.writeable_frame().fill(0x0F);
        fb.written();

        let mut capture = ScreenCapture::new();
        let chunk = capture.drain_chunk(&mut fb).unwrap();
        assert!(chunk[..64].chunks(2).all(|pair| pair == b"0F"));
    }
}
