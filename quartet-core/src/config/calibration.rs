//! Calibration data types
//!
//! Stores the per-channel ADC corrections, the pitch CV scale and the
//! display column offset. Written only by the external calibration flow;
//! the acquisition path treats it as read-only.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x51544343; // "QTCC"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Maximum CV channels across hardware variants (4 or 8)
pub const MAX_CV_CHANNELS: usize = 8;

/// Fixed-point unit of the pitch CV scale (`scale / 4096` is the real factor)
pub const PITCH_SCALE_ONE: i32 = 4096;

/// Nominal raw span of a two-octave (2V) interval, used before calibration:
/// 1V/oct over a 10V window sampled at 16-bit resolution.
const NOMINAL_TWO_OCTAVE_SPAN: i32 = 13107;

/// Default pitch CV scale for an uncalibrated unit
pub const DEFAULT_PITCH_CV_SCALE: i32 = (24 * 128 * PITCH_SCALE_ONE) / NOMINAL_TWO_OCTAVE_SPAN;

/// Default screensaver timeout in seconds
pub const DEFAULT_SCREENSAVER_TIMEOUT_S: u16 = 120;

/// Runtime ADC calibration installed into the acquisition path.
///
/// Sized for the actual channel count of the build; extracted from the
/// persisted [`CalibrationData`] record at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcCalibration<const CHANNELS: usize> {
    /// Signed offset subtracted from the smoothed reading, per channel
    pub offset: [i16; CHANNELS],
    /// Volts-per-octave scale factor for the designated pitch channel,
    /// in units of [`PITCH_SCALE_ONE`]
    pub pitch_scale: i32,
}

impl<const CHANNELS: usize> Default for AdcCalibration<CHANNELS> {
    fn default() -> Self {
        Self {
            offset: [0; CHANNELS],
            pitch_scale: DEFAULT_PITCH_CV_SCALE,
        }
    }
}

/// Complete calibration record stored in flash
///
/// Contains corrections for all channels of the largest hardware variant
/// plus display and UI settings, with a header for data validation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationData {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Signed ADC offset per channel
    pub adc_offset: [i16; MAX_CV_CHANNELS],
    /// Pitch CV scale factor (units of [`PITCH_SCALE_ONE`])
    pub pitch_cv_scale: i32,
    /// Display controller column offset correction
    pub display_column_offset: u8,
    /// Screensaver timeout in seconds
    pub screensaver_timeout_s: u16,
    /// CRC32 checksum (calculated over magic..settings)
    pub crc: u32,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationData {
    /// Create a calibration record with factory defaults
    pub const fn new() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            adc_offset: [0; MAX_CV_CHANNELS],
            pitch_cv_scale: DEFAULT_PITCH_CV_SCALE,
            display_column_offset: crate::traits::PageCommand::DEFAULT_COLUMN_OFFSET,
            screensaver_timeout_s: DEFAULT_SCREENSAVER_TIMEOUT_S,
            crc: 0,
        }
    }

    /// Check if the record header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Extract the runtime ADC calibration for a `CHANNELS`-wide build.
    pub fn adc_calibration<const CHANNELS: usize>(&self) -> AdcCalibration<CHANNELS> {
        let mut offset = [0i16; CHANNELS];
        for (dst, src) in offset.iter_mut().zip(self.adc_offset.iter()) {
            *dst = *src;
        }
        AdcCalibration {
            offset,
            pitch_scale: self.pitch_cv_scale,
        }
    }

    /// Store a freshly computed pitch scale back into the record.
    pub fn set_pitch_cv_scale(&mut self, scale: i32) {
        self.pitch_cv_scale = scale;
    }

    /// Calculate CRC32 over all fields except the crc itself
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        for offset in &self.adc_offset {
            crc = crc32_update(crc, &offset.to_le_bytes());
        }
        crc = crc32_update(crc, &self.pitch_cv_scale.to_le_bytes());
        crc = crc32_update(crc, &[self.display_column_offset]);
        crc = crc32_update(crc, &self.screensaver_timeout_s.to_le_bytes());

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
