//! Quartet - Eurorack CV/trigger I/O firmware
//!
//! RP2040 firmware for a 4-CV / 4-trigger Eurorack module with a paged
//! SH1106 OLED. One fixed-rate tick sequences all bus traffic and input
//! harvesting; everything else runs as ordinary async tasks around it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use quartet_core::scheduler::CoreScheduler;
use quartet_drivers::sh1106::Sh1106;
use quartet_drivers::staged::StagedBus;
use quartet_drivers::triggers::LatchedInputs;

use crate::channels::{SAMPLE_RING, TRIGGER_FLAGS};
use crate::dac::IdleDac;
use crate::sampler::RingSampler;

mod channels;
mod config;
mod dac;
mod render;
mod sampler;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static buffers for the capture UART (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Quartet firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Calibration record from the last flash sector
    let mut flash = config::ConfigFlash::new_blocking(p.FLASH);
    let calibration = config::load_calibration(&mut flash);

    // Display on SPI0 (TX only) with DC/CS/RST control pins
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = 24_000_000;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let dc = Output::new(p.PIN_20, Level::Low);
    let cs = Output::new(p.PIN_21, Level::High);
    let mut rst = Output::new(p.PIN_22, Level::High);

    // Reset pulse before the controller accepts commands
    rst.set_low();
    Timer::after_millis(10).await;
    rst.set_high();
    Timer::after_millis(20).await;

    let mut display = Sh1106::new(spi, dc, cs);
    if display.init().is_err() {
        warn!("display init failed, continuing headless");
    }
    info!("Display initialized");

    // ADC round robin over the four CV inputs (GPIO26-29)
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let cv_channels = [
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        AdcChannel::new_pin(p.PIN_28, Pull::None),
        AdcChannel::new_pin(p.PIN_29, Pull::None),
    ];

    // Trigger inputs, active low
    let trigger_pins = [
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
    ];

    // Capture/debug UART
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("Capture UART initialized");

    let mut scheduler: tasks::Scheduler = CoreScheduler::new(
        RingSampler::new(&SAMPLE_RING),
        LatchedInputs::new(&TRIGGER_FLAGS),
        StagedBus::new(display),
        IdleDac,
    );
    scheduler.init(&calibration);
    scheduler.enable_app();

    spawner.spawn(tasks::sampler_task(adc, cv_channels)).unwrap();
    for (line, pin) in trigger_pins.into_iter().enumerate() {
        spawner.spawn(tasks::trigger_task(pin, line)).unwrap();
    }
    spawner.spawn(tasks::core_task(scheduler)).unwrap();
    spawner.spawn(tasks::render_task()).unwrap();
    spawner.spawn(tasks::capture_task(rx, tx)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
