//! Segmented flash abstractions
//!
//! NOR flash can only clear bits when writing, so a byte may be written once
//! after its segment has been erased. The trait mirrors the two write styles
//! the firmware needs:
//!
//! - a sequential session opened at an address, with an internal cursor that
//!   only moves forward (`init_write` / `cont_write` / `write_byte`)
//! - single indexed writes at an explicit address (`write_byte_at`)
//!
//! Addresses are offsets from the start of the storage area handed to the
//! implementation, not absolute flash addresses.

/// Errors from flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Address outside the storage area
    OutOfBounds,
    /// Sequential write without an open session
    NotOpen,
}

/// Flash with erase segments and a sequential write cursor
pub trait SegmentFlash {
    /// Size of one erase segment in bytes
    fn segment_size(&self) -> u32;

    /// Erase the segment containing `addr` and open a write session at `addr`
    fn init_write(&mut self, addr: u32) -> Result<(), FlashError>;

    /// Open a write session at `addr` without erasing
    ///
    /// The caller guarantees the bytes from `addr` onward are still erased.
    fn cont_write(&mut self, addr: u32) -> Result<(), FlashError>;

    /// Write one byte at the session cursor and advance it
    fn write_byte(&mut self, byte: u8) -> Result<(), FlashError>;

    /// Write one byte at `addr`, independent of any session cursor
    fn write_byte_at(&mut self, byte: u8, addr: u32) -> Result<(), FlashError>;

    /// Close the current write session
    fn disable_write(&mut self);

    /// Read `buf.len()` bytes starting at `addr`
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Start offset of the segment containing `addr`
    fn segment_start(&self, addr: u32) -> u32 {
        addr - addr % self.segment_size()
    }
}
