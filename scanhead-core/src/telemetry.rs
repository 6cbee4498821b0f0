//! Telemetry reporting
//!
//! Every report is one value formatted into a small stack buffer and pushed
//! through [`ByteTx`] one byte at a time, terminated by a newline. Nothing is
//! retained between calls.

use core::fmt::Write;

use heapless::String;
use scanhead_hal::ByteTx;

/// Distance reported after the last step of a distance sweep
pub const OBJECT_SWEEP_END: u16 = 500;

/// Light level reported after the last step of a light sweep
pub const LIGHT_SWEEP_END: u16 = 1024;

/// Distance reported after the last step of a distance+light sweep
pub const LIGHT_OBJECT_SWEEP_END: u16 = 9999;

/// Line terminator for value reports
pub const TERMINATOR: u8 = b'\n';

/// Terminator of the upload acknowledgement
pub const ACK_TERMINATOR: u8 = 0;

/// Byte substituted for calibration values equal to the terminator
const ESCAPED_TERMINATOR: u8 = 11;

/// Reported quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Servo angle in degrees, 3 digits
    Angle,
    /// Distance in centimeters, 3 digits
    Distance,
    /// Light level, 4 digits
    Light,
    /// Echoed script opcode, 1 digit
    Opcode,
}

impl Field {
    fn width(self) -> usize {
        match self {
            Field::Angle | Field::Distance => 3,
            Field::Light => 4,
            Field::Opcode => 1,
        }
    }
}

/// Send one formatted value followed by the terminator
pub fn report<T: ByteTx + ?Sized>(tx: &mut T, field: Field, value: u16) {
    let mut buf: String<8> = String::new();
    // u16 needs at most 5 digits, so this cannot overflow
    let _ = write!(buf, "{:0width$}", value, width = field.width());
    tx.send_bytes(buf.as_bytes());
    tx.send_char(TERMINATOR);
}

/// Send the raw calibration reference values followed by the terminator
pub fn report_calibration<T: ByteTx + ?Sized>(tx: &mut T, points: &[u8]) {
    for &value in points {
        let byte = if value == TERMINATOR {
            ESCAPED_TERMINATOR
        } else {
            value
        };
        tx.send_char(byte);
    }
    tx.send_char(TERMINATOR);
}

/// Acknowledge a committed upload with the new script count
pub fn report_ack<T: ByteTx + ?Sized>(tx: &mut T, count: usize) {
    tx.send_char(b'0' + (count % 10) as u8);
    tx.send_char(ACK_TERMINATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTx;

    #[test]
    fn test_padded_fields() {
        let mut tx = MockTx::new();
        report(&mut tx, Field::Angle, 7);
        report(&mut tx, Field::Distance, 42);
        report(&mut tx, Field::Light, 512);
        report(&mut tx, Field::Opcode, 6);
        assert_eq!(tx.bytes(), b"007\n042\n0512\n6\n");
    }

    #[test]
    fn test_sentinels_print_naturally() {
        let mut tx = MockTx::new();
        report(&mut tx, Field::Distance, LIGHT_OBJECT_SWEEP_END);
        report(&mut tx, Field::Distance, OBJECT_SWEEP_END);
        report(&mut tx, Field::Light, LIGHT_SWEEP_END);
        assert_eq!(tx.bytes(), b"9999\n500\n1024\n");
    }

    #[test]
    fn test_calibration_escapes_terminator() {
        let mut tx = MockTx::new();
        report_calibration(&mut tx, &[1, 10, 200]);
        assert_eq!(tx.bytes(), &[1, 11, 200, b'\n']);
    }

    #[test]
    fn test_ack() {
        let mut tx = MockTx::new();
        report_ack(&mut tx, 3);
        report_ack(&mut tx, 10);
        assert_eq!(tx.bytes(), b"3\x000\x00");
    }
}
