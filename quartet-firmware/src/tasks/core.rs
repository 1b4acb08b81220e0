//! Core tick task
//!
//! Drives the real-time sequencer at the fixed tick rate. All bus
//! traffic (display pages, DAC refresh) and input harvesting happen
//! inside `CoreScheduler::tick`; this task only paces it and publishes
//! the per-tick input state for the render task.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, Ticker};

use quartet_core::digital::{line_mask, InputDisplay};
use quartet_core::scheduler::{AppHandler, CoreScheduler, InputSnapshot, TICK_PERIOD_US};
use quartet_drivers::sh1106::Sh1106;
use quartet_drivers::staged::StagedBus;
use quartet_drivers::triggers::LatchedInputs;

use crate::channels::{RenderState, CV_CHANNELS, RENDER_STATE, RING_FRAMES, TRIGGER_LINES};
use crate::channels::FRAME_BUFFER;
use crate::dac::IdleDac;
use crate::sampler::RingSampler;

/// The board's concrete scheduler wiring.
///
/// The SH1106 bus is staged: the tick only copies the page out of the
/// frame store, and the blocking SPI transfer runs after the critical
/// section so it never holds interrupts off.
pub type Scheduler = CoreScheduler<
    RingSampler<CV_CHANNELS, RING_FRAMES>,
    LatchedInputs<TRIGGER_LINES>,
    StagedBus<Sh1106<Spi<'static, SPI0, Blocking>, Output<'static>, Output<'static>>>,
    IdleDac,
    CV_CHANNELS,
    TRIGGER_LINES,
>;

/// Publishes each tick's inputs, with trigger decay, for the renderer.
struct InputPublisher {
    trigger_display: [InputDisplay; TRIGGER_LINES],
}

impl InputPublisher {
    fn new() -> Self {
        Self {
            trigger_display: [InputDisplay::new(); TRIGGER_LINES],
        }
    }
}

impl AppHandler<CV_CHANNELS> for InputPublisher {
    fn tick(&mut self, inputs: &InputSnapshot<CV_CHANNELS>) {
        let mut intensity = [0u8; TRIGGER_LINES];
        for (line, display) in self.trigger_display.iter_mut().enumerate() {
            display.update(1, inputs.clocked_mask & line_mask(line) != 0);
            intensity[line] = display.intensity();
        }
        let state = RenderState {
            ticks: inputs.ticks,
            cv: inputs.cv,
            trigger_intensity: intensity,
        };
        RENDER_STATE.lock(|s| s.set(state));
    }
}

#[embassy_executor::task]
pub async fn core_task(mut scheduler: Scheduler) {
    info!("core tick task started ({}us period)", TICK_PERIOD_US);

    let mut publisher = InputPublisher::new();
    let mut ticker = Ticker::every(Duration::from_micros(TICK_PERIOD_US as u64));
    loop {
        ticker.next().await;
        FRAME_BUFFER.lock(|fb| {
            let mut fb = fb.borrow_mut();
            scheduler.tick(&mut fb, Some(&mut publisher));
        });
        // The staged page goes out with interrupts live again.
        scheduler.display_mut().bus_mut().transmit();
    }
}
