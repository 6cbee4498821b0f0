//! Character readout
//!
//! Counting and rotation instructions show their progress on a small
//! character readout (two rows of sixteen cells).

/// Number of character cells on the readout
pub const READOUT_CELLS: u8 = 32;

/// Character/number readout
pub trait Readout {
    /// Show a number, replacing the previous content
    fn show_number(&mut self, value: u16);

    /// Show a single character at a cell position, other cells blank
    fn show_char(&mut self, position: u8, ch: u8);

    /// Blank the readout
    fn clear(&mut self);
}
