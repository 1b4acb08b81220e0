//! Fixed-rate core tick
//!
//! Everything time-critical hangs off one periodic tick: the previous
//! display page is flushed, the DAC is refreshed, the next page is
//! queued, analog and digital inputs are harvested, and only then does
//! the application run with a consistent snapshot of this tick's inputs.
//! The ordering is deliberate - the bus must be released before the DAC
//! touches it, and inputs must be stable before the application sees
//! them.

use crate::acquisition::AnalogAcquisition;
use crate::config::CalibrationData;
use crate::digital::DigitalInputs;
use crate::display::{FrameBuffer, PagedDisplay, FRAME_SIZE};
use crate::traits::{AutonomousSampler, DacDriver, PageBus, TriggerLatch};

/// Core tick period in microseconds
pub const TICK_PERIOD_US: u32 = 60;

/// Core tick frequency in Hz
pub const TICK_FREQ: u32 = 1_000_000 / TICK_PERIOD_US;

/// Consistent view of the inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot<const CHANNELS: usize> {
    /// Ticks elapsed since `init()`
    pub ticks: u32,
    /// Calibrated, smoothed CV values
    pub cv: [i32; CHANNELS],
    /// Lines clocked since the previous tick
    pub clocked_mask: u32,
}

/// Per-tick application hook, called after the inputs settle.
pub trait AppHandler<const CHANNELS: usize> {
    fn tick(&mut self, inputs: &InputSnapshot<CHANNELS>);
}

/// Owner and sequencer of the real-time I/O peripherals.
pub struct CoreScheduler<S, T, B, D, const CV: usize, const TRIGGERS: usize>
where
    S: AutonomousSampler<CV>,
    T: TriggerLatch<TRIGGERS>,
    B: PageBus,
    D: DacDriver,
{
    adc: AnalogAcquisition<S, CV>,
    digital: DigitalInputs<T, TRIGGERS>,
    display: PagedDisplay<B>,
    dac: D,
    ticks: u32,
    app_enabled: bool,
}

impl<S, T, B, D, const CV: usize, const TRIGGERS: usize> CoreScheduler<S, T, B, D, CV, TRIGGERS>
where
    S: AutonomousSampler<CV>,
    T: TriggerLatch<TRIGGERS>,
    B: PageBus,
    D: DacDriver,
{
    pub fn new(sampler: S, latch: T, bus: B, dac: D) -> Self {
        Self {
            adc: AnalogAcquisition::new(sampler),
            digital: DigitalInputs::new(latch),
            display: PagedDisplay::new(bus),
            dac,
            ticks: 0,
            app_enabled: false,
        }
    }

    /// Apply persisted calibration and start autonomous acquisition.
    ///
    /// The application hook stays disabled until `enable_app()` so the
    /// first ticks can settle the smoothing filters.
    pub fn init(&mut self, calibration: &CalibrationData) {
        self.adc.init(calibration.adc_calibration::<CV>());
        self.display.init(calibration.display_column_offset);
        self.ticks = 0;
        self.app_enabled = false;
    }

    /// Allow the application hook to run from the next tick on.
    pub fn enable_app(&mut self) {
        self.app_enabled = true;
    }

    /// One core tick. Fixed ordering:
    ///
    /// 1. flush the previous page transfer (releases the bus)
    /// 2. refresh the DAC
    /// 3. queue the next display page
    /// 4. harvest the analog ring
    /// 5. consume the digital edge latches
    /// 6. advance the tick counter, then run the application
    pub fn tick<const FRAMES: usize>(
        &mut self,
        fb: &mut FrameBuffer<FRAME_SIZE, FRAMES>,
        app: Option<&mut dyn AppHandler<CV>>,
    ) {
        self.display.flush();
        self.dac.update();
        self.display.update(fb);
        self.adc.harvest();
        self.digital.scan();
        self.ticks = self.ticks.wrapping_add(1);

        if self.app_enabled {
            if let Some(app) = app {
                let snapshot = self.snapshot();
                app.tick(&snapshot);
            }
        }
    }

    /// This tick's inputs, as the application hook sees them.
    pub fn snapshot(&self) -> InputSnapshot<CV> {
        let mut cv = [0i32; CV];
        for (channel, value) in cv.iter_mut().enumerate() {
            *value = self.adc.value(channel);
        }
        InputSnapshot {
            ticks: self.ticks,
            cv,
            clocked_mask: self.digital.clocked(),
        }
    }

    /// Ticks elapsed since `init()`.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn adc(&self) -> &AnalogAcquisition<S, CV> {
        &self.adc
    }

    pub fn adc_mut(&mut self) -> &mut AnalogAcquisition<S, CV> {
        &mut self.adc
    }

    pub fn digital(&self) -> &DigitalInputs<T, TRIGGERS> {
        &self.digital
    }

    pub fn digital_mut(&mut self) -> &mut DigitalInputs<T, TRIGGERS> {
        &mut self.digital
    }

    pub fn display(&self) -> &PagedDisplay<B> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut PagedDisplay<B> {
        &mut self.display
    }

    pub fn dac_mut(&mut self) -> &mut D {
        &mut self.dac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::FRAME_COUNT;
    use crate::traits::PageCommand;
    use core::cell::Cell;

    /// Shared call-order clock; each mock stamps the moment it runs.
    struct Seq(Cell<u32>);

    impl Seq {
        fn new() -> Self {
            Seq(Cell::new(0))
        }

        fn stamp(&self) -> u32 {
            let n = self.0.get();
            self.0.set(n + 1);
            n
        }
    }

    struct SeqSampler<'a> {
        seq: &'a Seq,
        harvested_at: Cell<Option<u32>>,
        write_pos: u32,
    }

    impl<'a> AutonomousSampler<2> for SeqSampler<'a> {
        fn start(&mut self) {}

        fn capacity(&self) -> u32 {
            16
        }

        fn write_pos(&self) -> u32 {
            self.harvested_at.set(Some(self.seq.stamp()));
            self.write_pos
        }

        fn frame(&self, _pos: u32) -> [u16; 2] {
            [100, 200]
        }
    }

    struct SeqLatch<'a> {
        seq: &'a Seq,
        scanned_at: Option<u32>,
        pending: u32,
    }

    impl<'a> TriggerLatch<2> for SeqLatch<'a> {
        fn take_edges(&mut self) -> u32 {
            self.scanned_at = Some(self.seq.stamp());
            core::mem::take(&mut self.pending)
        }

        fn level(&mut self, _line: usize) -> bool {
            false
        }
    }

    struct SeqBus<'a> {
        seq: &'a Seq,
        flushed_at: Cell<Option<u32>>,
        page_at: Option<u32>,
        busy: bool,
    }

    impl<'a> PageBus for SeqBus<'a> {
        fn begin_page(&mut self, _command: &PageCommand, _data: &[u8]) {
            self.page_at = Some(self.seq.stamp());
            self.busy = true;
        }

        fn busy(&self) -> bool {
            self.flushed_at.set(Some(self.seq.stamp()));
            self.busy
        }

        fn transfer_complete(&self) -> bool {
            true
        }

        fn finish(&mut self) {
            self.busy = false;
        }
    }

    struct SeqDac<'a> {
        seq: &'a Seq,
        updated_at: Option<u32>,
    }

    impl<'a> DacDriver for SeqDac<'a> {
        fn update(&mut self) {
            self.updated_at = Some(self.seq.stamp());
        }
    }

    struct RecordingApp {
        snapshots: heapless::Vec<InputSnapshot<2>, 8>,
    }

    impl AppHandler<2> for RecordingApp {
        fn tick(&mut self, inputs: &InputSnapshot<2>) {
            self.snapshots.push(*inputs).unwrap();
        }
    }

    fn scheduler(seq: &Seq) -> CoreScheduler<SeqSampler<'_>, SeqLatch<'_>, SeqBus<'_>, SeqDac<'_>, 2, 2> {
        CoreScheduler::new(
            SeqSampler {
                seq,
                harvested_at: Cell::new(None),
                write_pos: 0,
            },
            SeqLatch {
                seq,
                scanned_at: None,
                pending: 0,
            },
            SeqBus {
                seq,
                flushed_at: Cell::new(None),
                page_at: None,
                busy: false,
            },
            SeqDac {
                seq,
                updated_at: None,
            },
        )
    }

    #[test]
    fn test_tick_ordering() {
        let seq = Seq::new();
        let mut core = scheduler(&seq);
        core.init(&CalibrationData::new());

        let mut fb: FrameBuffer<FRAME_SIZE, FRAME_COUNT> = FrameBuffer::new();
        fb.written(); // give the display something to send

        core.tick(&mut fb, None);

        let flushed = core.display().bus().flushed_at.get().unwrap();
        let dac = core.dac.updated_at.unwrap();
        let page = core.display().bus().page_at.unwrap();
        let harvested = core.adc().sampler().harvested_at.get().unwrap();
        let scanned = core.digital().latch().scanned_at.unwrap();

        assert!(flushed < dac);
        assert!(dac < page);
        assert!(page < harvested);
        assert!(harvested < scanned);
        assert_eq!(core.ticks(), 1);
    }

    #[test]
    fn test_app_gated_until_enabled() {
        let seq = Seq::new();
        let mut core = scheduler(&seq);
        core.init(&CalibrationData::new());
        let mut fb: FrameBuffer<FRAME_SIZE, FRAME_COUNT> = FrameBuffer::new();
        let mut app = RecordingApp {
            snapshots: heapless::Vec::new(),
        };

        core.tick(&mut fb, Some(&mut app));
        assert!(app.snapshots.is_empty());

        core.enable_app();
        core.tick(&mut fb, Some(&mut app));
        assert_eq!(app.snapshots.len(), 1);
    }

    #[test]
    fn test_snapshot_reflects_this_tick() {
        let seq = Seq::new();
        let mut core = scheduler(&seq);
        core.init(&CalibrationData::new());
        core.enable_app();

        // Two frames pending in the ring, one edge latched.
        core.adc_mut().sampler_mut().write_pos = 2;
        core.digital_mut().latch_mut().pending = 0b01;

        let mut fb: FrameBuffer<FRAME_SIZE, FRAME_COUNT> = FrameBuffer::new();
        let mut app = RecordingApp {
            snapshots: heapless::Vec::new(),
        };
        core.tick(&mut fb, Some(&mut app));

        let snap = &app.snapshots[0];
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.clocked_mask, 0b01);
        // First harvest of a constant signal: smoothed = raw / SMOOTHING.
        assert_eq!(snap.cv, [25, 50]);

        // Edge consumed: the next snapshot is clear.
        core.tick(&mut fb, Some(&mut app));
        assert_eq!(app.snapshots[1].clocked_mask, 0);
        assert_eq!(app.snapshots[1].ticks, 2);
    }

    #[test]
    fn test_init_resets_tick_counter_and_gates_app() {
        let seq = Seq::new();
        let mut core = scheduler(&seq);
        core.init(&CalibrationData::new());
        core.enable_app();

        let mut fb: FrameBuffer<FRAME_SIZE, FRAME_COUNT> = FrameBuffer::new();
        core.tick(&mut fb, None);
        core.tick(&mut fb, None);
        assert_eq!(core.ticks(), 2);

        core.init(&CalibrationData::new());
        assert_eq!(core.ticks(), 0);

        let mut app = RecordingApp {
            snapshots: heapless::Vec::new(),
        };
        core.tick(&mut fb, Some(&mut app));
        assert!(app.snapshots.is_empty());
    }
}
