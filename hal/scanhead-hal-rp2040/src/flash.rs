//! Flash storage driver for RP2040
//!
//! The scanhead keeps scripts, the script directory and the calibration
//! table in the last 64KB of flash. Core addresses are offsets into that
//! partition; this driver translates them and enforces the bounds.
//!
//! Implements the `SegmentFlash` trait from `scanhead-hal`.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

pub use scanhead_hal::flash::{FlashError, SegmentFlash};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const STORAGE_PARTITION_SIZE: u32 = 64 * 1024;
pub const STORAGE_PARTITION_START: u32 = FLASH_SIZE as u32 - STORAGE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: u32 = ERASE_SIZE as u32;

/// RP2040 segmented flash
///
/// Writes program single bytes; the embassy driver takes care of running
/// from RAM while the XIP flash is busy.
pub struct Rp2040SegmentFlash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    cursor: Option<u32>,
}

impl<'d> Rp2040SegmentFlash<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            cursor: None,
        }
    }

    /// Translate a partition offset to an absolute flash offset
    fn absolute(addr: u32, len: u32) -> Result<u32, FlashError> {
        match addr.checked_add(len) {
            Some(end) if end <= STORAGE_PARTITION_SIZE => Ok(STORAGE_PARTITION_START + addr),
            _ => Err(FlashError::OutOfBounds),
        }
    }

    fn program(&mut self, addr: u32, byte: u8) -> Result<(), FlashError> {
        let offset = Self::absolute(addr, 1)?;
        self.flash
            .blocking_write(offset, &[byte])
            .map_err(|_| FlashError::Flash)
    }
}

impl SegmentFlash for Rp2040SegmentFlash<'_> {
    fn segment_size(&self) -> u32 {
        FLASH_ERASE_SIZE
    }

    fn init_write(&mut self, addr: u32) -> Result<(), FlashError> {
        let start = Self::absolute(self.segment_start(addr), FLASH_ERASE_SIZE)?;
        self.flash
            .blocking_erase(start, start + FLASH_ERASE_SIZE)
            .map_err(|_| FlashError::Flash)?;
        self.cursor = Some(addr);
        Ok(())
    }

    fn cont_write(&mut self, addr: u32) -> Result<(), FlashError> {
        Self::absolute(addr, 0)?;
        self.cursor = Some(addr);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), FlashError> {
        let addr = self.cursor.ok_or(FlashError::NotOpen)?;
        self.program(addr, byte)?;
        self.cursor = Some(addr + 1);
        Ok(())
    }

    fn write_byte_at(&mut self, byte: u8, addr: u32) -> Result<(), FlashError> {
        self.program(addr, byte)
    }

    fn disable_write(&mut self) {
        self.cursor = None;
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let offset = Self::absolute(addr, buf.len() as u32)?;
        self.flash
            .blocking_read(offset, buf)
            .map_err(|_| FlashError::Flash)
    }
}
