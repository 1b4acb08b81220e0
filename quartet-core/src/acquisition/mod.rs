//! CV acquisition
//!
//! Converts freshly DMA-captured converter frames into per-channel
//! calibrated, smoothed values. The sampling engine fills its ring
//! continuously; `harvest()` runs once per core tick, aggregates exactly
//! the frames that arrived since the previous harvest, and never blocks.

use crate::config::{AdcCalibration, PITCH_SCALE_ONE};
use crate::traits::AutonomousSampler;

/// Fixed weight of the smoothing filter:
/// `smoothed = (smoothed * (SMOOTHING - 1) + raw) / SMOOTHING`
pub const SMOOTHING: u32 = 4;

/// Per-tick CV acquisition state over an autonomous sampling engine.
pub struct AnalogAcquisition<S, const CHANNELS: usize> {
    sampler: S,
    /// Consumer cursor into the sample ring, in whole frames.
    /// Invariant: never passes the hardware write position.
    read_pos: u32,
    raw: [u16; CHANNELS],
    smoothed: [u32; CHANNELS],
    calibration: AdcCalibration<CHANNELS>,
}

impl<S, const CHANNELS: usize> AnalogAcquisition<S, CHANNELS>
where
    S: AutonomousSampler<CHANNELS>,
{
    pub fn new(sampler: S) -> Self {
        Self {
            sampler,
            read_pos: 0,
            raw: [0; CHANNELS],
            smoothed: [0; CHANNELS],
            calibration: AdcCalibration {
                offset: [0; CHANNELS],
                pitch_scale: 0,
            },
        }
    }

    /// Reset all channel state, install calibration and start sampling.
    pub fn init(&mut self, calibration: AdcCalibration<CHANNELS>) {
        self.raw = [0; CHANNELS];
        self.smoothed = [0; CHANNELS];
        self.calibration = calibration;
        self.sampler.start();
        self.read_pos = self.sampler.write_pos();
    }

    /// Aggregate the frames deposited since the previous harvest.
    ///
    /// Called once per tick. If no whole frame has arrived (including the
    /// window right after boot before the engine completes its first
    /// round), channel state is left untouched for this tick.
    pub fn harvest(&mut self) {
        let write_pos = self.sampler.write_pos();
        let mut count = write_pos.wrapping_sub(self.read_pos);
        if count == 0 {
            return;
        }

        // If the ring lapped us, only the newest `capacity` frames survive.
        let capacity = self.sampler.capacity();
        if count > capacity {
            self.read_pos = write_pos.wrapping_sub(capacity);
            count = capacity;
        }

        let mut sum = [0u32; CHANNELS];
        for i in 0..count {
            let frame = self.sampler.frame(self.read_pos.wrapping_add(i));
            for (acc, sample) in sum.iter_mut().zip(frame.iter()) {
                *acc += u32::from(*sample);
            }
        }
        self.read_pos = write_pos;

        for ch in 0..CHANNELS {
            let raw = (sum[ch] / count) as u16;
            self.raw[ch] = raw;
            self.smoothed[ch] =
                (self.smoothed[ch] * (SMOOTHING - 1) + u32::from(raw)) / SMOOTHING;
        }
    }

    /// Calibrated, smoothed reading: `smoothed - offset`, signed.
    pub fn value(&self, channel: usize) -> i32 {
        self.smoothed[channel] as i32 - i32::from(self.calibration.offset[channel])
    }

    /// Last aggregated raw sample, uncalibrated.
    pub fn raw_value(&self, channel: usize) -> u16 {
        self.raw[channel]
    }

    /// Smoothed reading before offset correction.
    pub fn smoothed(&self, channel: usize) -> u32 {
        self.smoothed[channel]
    }

    /// Calibrated reading converted to pitch units (128 per semitone)
    /// via the stored volts-per-octave scale.
    pub fn pitch_value(&self, channel: usize) -> i32 {
        (self.value(channel) * self.calibration.pitch_scale) >> 12
    }

    /// Derive the pitch scale from two raw readings taken a known
    /// two-octave interval apart.
    ///
    /// Rejected silently (prior scale untouched) when `ref_high` is not
    /// above `ref_low` - never divide by a non-positive span.
    pub fn calibrate_pitch(&mut self, ref_low: i32, ref_high: i32) {
        if ref_low < ref_high {
            self.calibration.pitch_scale = (24 * 128 * PITCH_SCALE_ONE) / (ref_high - ref_low);
        }
    }

    /// Current calibration, for the external calibration flow.
    pub fn calibration(&self) -> &AdcCalibration<CHANNELS> {
        &self.calibration
    }

    /// Replace the calibration (external calibration flow only).
    pub fn set_calibration(&mut self, calibration: AdcCalibration<CHANNELS>) {
        self.calibration = calibration;
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scriptable sampler: frames are appended by the test, the "hardware"
    /// write position advances with them.
    struct ScriptedSampler<const N: usize> {
        frames: heapless::Vec<[u16; N], 256>,
        capacity: u32,
        started: bool,
    }

    impl<const N: usize> ScriptedSampler<N> {
        fn new(capacity: u32) -> Self {
            Self {
                frames: heapless::Vec::new(),
                capacity,
                started: false,
            }
        }

        fn push(&mut self, frame: [u16; N]) {
            self.frames.push(frame).unwrap();
        }
    }

    impl<const N: usize> AutonomousSampler<N> for ScriptedSampler<N> {
        fn start(&mut self) {
            self.started = true;
        }

        fn capacity(&self) -> u32 {
            self.capacity
        }

        fn write_pos(&self) -> u32 {
            self.frames.len() as u32
        }

        fn frame(&self, pos: u32) -> [u16; N] {
            // Ring semantics: positions map modulo capacity onto the
            // most recent frames.
            let len = self.frames.len() as u32;
            assert!(len.wrapping_sub(pos) <= self.capacity, "frame overwritten");
            self.frames[pos as usize]
        }
    }

    fn make_acq(capacity: u32) -> AnalogAcquisition<ScriptedSampler<2>, 2> {
        let mut acq = AnalogAcquisition::new(ScriptedSampler::new(capacity));
        acq.init(AdcCalibration::default());
        acq
    }

    #[test]
    fn test_harvest_averages_new_frames_only() {
        let mut acq = make_acq(32);
        for v in [10u16, 20, 30, 40] {
            acq.sampler.push([v, 100]);
        }
        acq.harvest();
        assert_eq!(acq.raw_value(0), 25);
        assert_eq!(acq.raw_value(1), 100);

        // Nothing new: state unchanged this tick.
        let smoothed_before = acq.smoothed(0);
        acq.harvest();
        assert_eq!(acq.raw_value(0), 25);
        assert_eq!(acq.smoothed(0), smoothed_before);

        // Next batch must not re-read the consumed frames.
        acq.sampler.push([100, 0]);
        acq.sampler.push([200, 0]);
        acq.harvest();
        assert_eq!(acq.raw_value(0), 150);
    }

    #[test]
    fn test_harvest_truncating_average() {
        let mut acq = make_acq(32);
        acq.sampler.push([10, 0]);
        acq.sampler.push([11, 0]);
        acq.sampler.push([11, 0]);
        acq.harvest();
        assert_eq!(acq.raw_value(0), 10); // 32 / 3, truncated
    }

    #[test]
    fn test_harvest_empty_ring_after_boot() {
        let mut acq = make_acq(32);
        assert!(acq.sampler.started);
        acq.harvest();
        assert_eq!(acq.raw_value(0), 0);
        assert_eq!(acq.smoothed(0), 0);
        assert_eq!(acq.value(0), 0);
    }

    #[test]
    fn test_smoothing_decay() {
        let mut acq = make_acq(64);
        // Step input: smoothed approaches raw with weight 1/4 per harvest.
        acq.sampler.push([1000, 0]);
        acq.harvest();
        assert_eq!(acq.smoothed(0), 250);

        acq.sampler.push([1000, 0]);
        acq.harvest();
        assert_eq!(acq.smoothed(0), (250 * 3 + 1000) / 4);
    }

    #[test]
    fn test_value_applies_offset() {
        let mut acq = make_acq(32);
        acq.set_calibration(AdcCalibration {
            offset: [100, -50],
            pitch_scale: DEFAULT_SCALE,
        });
        for _ in 0..32 {
            acq.sampler.push([400, 400]);
        }
        for _ in 0..8 {
            acq.harvest();
        }
        assert_eq!(acq.value(0), acq.smoothed(0) as i32 - 100);
        assert_eq!(acq.value(1), acq.smoothed(1) as i32 + 50);
    }

    const DEFAULT_SCALE: i32 = crate::config::DEFAULT_PITCH_CV_SCALE;

    #[test]
    fn test_calibrate_pitch_valid_span() {
        let mut acq = make_acq(32);
        acq.calibrate_pitch(1000, 5000);
        assert_eq!(acq.calibration().pitch_scale, (24 * 128 * 4096) / 4000);
    }

    #[test]
    fn test_calibrate_pitch_rejects_bad_span() {
        let mut acq = make_acq(32);
        let before = acq.calibration().pitch_scale;

        acq.calibrate_pitch(100, 50);
        assert_eq!(acq.calibration().pitch_scale, before);

        acq.calibrate_pitch(100, 100);
        assert_eq!(acq.calibration().pitch_scale, before);
    }

    #[test]
    fn test_pitch_value_scaling() {
        let mut acq = make_acq(32);
        acq.set_calibration(AdcCalibration {
            offset: [0, 0],
            pitch_scale: 4096, // unity
        });
        acq.sampler.push([512, 0]);
        for _ in 0..64 {
            acq.sampler.push([512, 0]);
            acq.harvest();
        }
        assert_eq!(acq.pitch_value(0), acq.value(0));
    }
}
