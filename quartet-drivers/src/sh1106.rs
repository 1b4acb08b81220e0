//! SH1106 OLED display driver
//!
//! 128x64 SH1106 over 4-wire SPI (blocking). This is the synchronous
//! page-bus generation: a page transfer completes inside `begin_page()`
//! itself, so the bus is never observed busy by the transfer engine.
//!
//! The board's reset line is pulsed during bring-up, before `init()`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use quartet_core::display::{NUM_PAGES, PAGE_SIZE};
use quartet_core::traits::{PageBus, PageCommand};

/// SH1106 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const OUTPUT_RAM: u8 = 0xA4;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

/// Power-up command sequence, display left off until the RAM is cleared.
const INIT_SEQ: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // charge pump enabled
    cmd::SET_MEMORY_MODE,
    0x00, // page addressing
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DEACTIVATE_SCROLL,
    cmd::OUTPUT_RAM,
    cmd::SET_NORMAL,
];

/// Display driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI bus error
    Spi(E),
    /// DC or CS pin error
    Pin,
}

/// SH1106 over blocking SPI with DC and CS control pins.
pub struct Sh1106<SPI, DC, CS> {
    spi: SPI,
    dc: DC,
    cs: CS,
}

impl<SPI, DC, CS> Sh1106<SPI, DC, CS>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, cs: CS) -> Self {
        Self { spi, dc, cs }
    }

    /// Run the power-up sequence, clear display RAM and switch on.
    pub fn init(&mut self) -> Result<(), Error<SPI::Error>> {
        self.commands(INIT_SEQ)?;
        self.clear()?;
        self.set_display_on(true)
    }

    /// Send a raw command sequence (instruction mode, one CS window).
    fn commands(&mut self, seq: &[u8]) -> Result<(), Error<SPI::Error>> {
        self.dc.set_low().map_err(|_| Error::Pin)?;
        self.cs.set_low().map_err(|_| Error::Pin)?;
        let result = self
            .spi
            .write(seq)
            .and_then(|_| self.spi.flush())
            .map_err(Error::Spi);
        self.cs.set_high().map_err(|_| Error::Pin)?;
        result
    }

    /// Write one page: 3 addressing bytes in instruction mode, then the
    /// page data in data mode, all inside one CS window.
    pub fn send_page(
        &mut self,
        command: &PageCommand,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.dc.set_low().map_err(|_| Error::Pin)?;
        self.cs.set_low().map_err(|_| Error::Pin)?;
        let result = self.transfer_page(command, data);
        self.cs.set_high().map_err(|_| Error::Pin)?;
        result
    }

    fn transfer_page(
        &mut self,
        command: &PageCommand,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.spi.write(command.bytes()).map_err(Error::Spi)?;
        self.dc.set_high().map_err(|_| Error::Pin)?;
        self.spi.write(data).map_err(Error::Spi)?;
        self.spi.flush().map_err(Error::Spi)
    }

    /// Zero all display RAM pages.
    pub fn clear(&mut self) -> Result<(), Error<SPI::Error>> {
        let empty = [0u8; PAGE_SIZE];
        for page in 0..NUM_PAGES as u8 {
            let command = PageCommand::new(page, PageCommand::DEFAULT_COLUMN_OFFSET);
            self.send_page(&command, &empty)?;
        }
        Ok(())
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<SPI::Error>> {
        self.commands(&[cmd::SET_CONTRAST, contrast])
    }

    pub fn set_display_on(&mut self, on: bool) -> Result<(), Error<SPI::Error>> {
        self.commands(&[if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF }])
    }

    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error<SPI::Error>> {
        self.commands(&[if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        }])
    }
}

impl<SPI, DC, CS> PageBus for Sh1106<SPI, DC, CS>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Synchronous transfer: the page is fully written before returning.
    /// The real-time path is best effort, a failed write drops the page.
    fn begin_page(&mut self, command: &PageCommand, data: &[u8]) {
        let _ = self.send_page(command, data);
    }

    fn busy(&self) -> bool {
        false
    }

    fn transfer_complete(&self) -> bool {
        true
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct MockSpi {
        written: heapless::Vec<u8, 4096>,
        flushes: u32,
    }

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiBus<u8> for MockSpi {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            self.written.extend_from_slice(words).unwrap();
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPin {
        states: heapless::Vec<bool, 128>,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.states.push(false).unwrap();
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.states.push(true).unwrap();
            Ok(())
        }
    }

    fn display() -> Sh1106<MockSpi, MockPin, MockPin> {
        Sh1106::new(MockSpi::default(), MockPin::default(), MockPin::default())
    }

    #[test]
    fn test_send_page_byte_stream() {
        let mut display = display();
        let data = [0x55u8; PAGE_SIZE];
        let command = PageCommand::new(3, 0x02);

        display.send_page(&command, &data).unwrap();

        // Addressing bytes first, then the page data.
        assert_eq!(&display.spi.written[..3], &[0x10, 0x02, 0xb3]);
        assert_eq!(&display.spi.written[3..], &data);
        // DC: instruction mode for the command, data mode for the payload.
        assert_eq!(&display.dc.states, &[false, true]);
        // CS held low across the whole window.
        assert_eq!(&display.cs.states, &[false, true]);
        assert_eq!(display.spi.flushes, 1);
    }

    #[test]
    fn test_init_sends_power_up_then_clear_then_on() {
        let mut display = display();
        display.init().unwrap();

        let written = &display.spi.written;
        assert_eq!(&written[..INIT_SEQ.len()], INIT_SEQ);
        // All pages cleared: 8 x (3 command bytes + 128 zeros).
        let clear_len = NUM_PAGES * (3 + PAGE_SIZE);
        let clear = &written[INIT_SEQ.len()..INIT_SEQ.len() + clear_len];
        assert!(clear.chunks(3 + PAGE_SIZE).all(|c| c[3..].iter().all(|&b| b == 0)));
        // Display switched on last.
        assert_eq!(written[written.len() - 1], cmd::DISPLAY_ON);
    }

    #[test]
    fn test_page_bus_is_synchronous() {
        let mut display = display();
        let data = [0u8; PAGE_SIZE];
        display.begin_page(&PageCommand::new(0, 0x02), &data);
        assert!(!display.busy());
        assert!(display.transfer_complete());
    }

    #[test]
    fn test_contrast_command() {
        let mut display = display();
        display.set_contrast(0x7F).unwrap();
        assert_eq!(&display.spi.written[..], &[cmd::SET_CONTRAST, 0x7F]);
        assert_eq!(&display.dc.states, &[false]);
    }
}
