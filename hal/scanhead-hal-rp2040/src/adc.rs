//! Light sensor conversions
//!
//! The two LDR dividers sit on ADC0 (GPIO26) and ADC1 (GPIO27). A
//! conversion reads both, left sensor first, as raw 12-bit counts.

use embassy_rp::adc::{Adc, Async, Channel, Error};

/// ADC with both light sensor channels
pub struct LdrPair<'d> {
    adc: Adc<'d, Async>,
    ldr1: Channel<'d>,
    ldr2: Channel<'d>,
}

impl<'d> LdrPair<'d> {
    pub fn new(adc: Adc<'d, Async>, ldr1: Channel<'d>, ldr2: Channel<'d>) -> Self {
        Self { adc, ldr1, ldr2 }
    }

    /// Convert both channels
    pub async fn read(&mut self) -> Result<(u16, u16), Error> {
        let ldr1 = self.adc.read(&mut self.ldr1).await?;
        let ldr2 = self.adc.read(&mut self.ldr2).await?;
        Ok((ldr1, ldr2))
    }
}
