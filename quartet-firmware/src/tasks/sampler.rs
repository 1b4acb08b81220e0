//! CV acquisition task
//!
//! Free-running ADC round robin: converts all channels back to back and
//! deposits whole frames in the shared sample ring. The core tick
//! harvests and averages whatever accumulated since its last tick.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};

use crate::channels::{CV_CHANNELS, SAMPLE_RING};

#[embassy_executor::task]
pub async fn sampler_task(mut adc: Adc<'static, Async>, mut channels: [Channel<'static>; CV_CHANNELS]) {
    info!("sampler task started");

    loop {
        let mut frame = [0u16; CV_CHANNELS];
        for (channel, sample) in channels.iter_mut().zip(frame.iter_mut()) {
            // Conversion errors yield a zero sample; the averaging and
            // smoothing upstream absorb the occasional dropout.
            *sample = adc.read(channel).await.unwrap_or(0);
        }
        SAMPLE_RING.push(frame);
    }
}
