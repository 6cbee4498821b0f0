//! Serial byte transmission
//!
//! Telemetry is composed from repeated single-byte sends.

/// Byte transmitter towards the host
pub trait ByteTx {
    /// Queue one byte for transmission
    fn send_char(&mut self, byte: u8);

    /// Queue several bytes in order
    fn send_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.send_char(byte);
        }
    }
}
