//! Calibration persistence
//!
//! The calibration record lives in the last flash sector as a postcard
//! blob guarded by the record's own magic/version/CRC header. Anything
//! that fails validation falls back to defaults; the module stays
//! usable uncalibrated.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use quartet_core::config::CalibrationData;

use defmt::*;

/// Total flash size (2MB parts)
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Calibration record offset: last erase sector
pub const CALIBRATION_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Serialized record ceiling; the actual postcard blob is smaller.
const RECORD_BUF: usize = 64;

pub type ConfigFlash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// Load the calibration record, or defaults when none verifies.
pub fn load_calibration(flash: &mut ConfigFlash<'_>) -> CalibrationData {
    let mut buf = [0u8; RECORD_BUF];
    if flash.blocking_read(CALIBRATION_OFFSET, &mut buf).is_err() {
        warn!("calibration read failed, using defaults");
        return CalibrationData::new();
    }

    match postcard::from_bytes::<CalibrationData>(&buf) {
        Ok(data) if data.is_valid() && data.verify_crc() => {
            info!("calibration record loaded");
            data
        }
        _ => {
            info!("no valid calibration record, using defaults");
            CalibrationData::new()
        }
    }
}

/// Persist a calibration record (CRC is refreshed before writing).
/// Exercised by the host-side calibration flow.
#[allow(dead_code)]
pub fn save_calibration(
    flash: &mut ConfigFlash<'_>,
    data: &mut CalibrationData,
) -> Result<(), embassy_rp::flash::Error> {
    data.update_crc();
    let mut buf = [0u8; RECORD_BUF];
    let used = postcard::to_slice(data, &mut buf)
        .map(|s| s.len())
        .unwrap_or(0);
    if used == 0 {
        return Ok(());
    }
    flash.blocking_erase(CALIBRATION_OFFSET, CALIBRATION_OFFSET + ERASE_SIZE as u32)?;
    flash.blocking_write(CALIBRATION_OFFSET, &buf)
}
