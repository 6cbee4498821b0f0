//! Light sensor conversion task
//!
//! A failed conversion is still answered so the requesting mode never waits
//! on a result that will not come.

use defmt::*;

use scanhead_core::state::Event;
use scanhead_hal_rp2040::LdrPair;

use crate::channels::{gate_open, post, ADC_GATE, CONVERSION_REQUEST, LDR};

#[embassy_executor::task]
pub async fn ldr_task(mut ldrs: LdrPair<'static>) {
    info!("LDR task started");

    loop {
        CONVERSION_REQUEST.wait().await;

        if !gate_open(&ADC_GATE) {
            continue;
        }

        let event = match ldrs.read().await {
            Ok((ldr1, ldr2)) => {
                trace!("LDR {} {}", ldr1, ldr2);
                Event::LdrSampled { ldr1, ldr2 }
            }
            Err(e) => {
                warn!("LDR conversion failed: {:?}", Debug2Format(&e));
                Event::LdrFailed
            }
        };

        if gate_open(&ADC_GATE) {
            post(&LDR, event);
        }
    }
}
