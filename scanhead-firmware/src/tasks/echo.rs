//! Echo capture task
//!
//! Waits for a trigger request, fires the ranger and posts the pulse width.
//! A missing or overlong echo is posted as a timeout.

use defmt::*;
use embassy_time::Duration;

use scanhead_core::state::Event;
use scanhead_hal_rp2040::EchoRanger;

use crate::channels::{gate_open, post, ECHO, ECHO_GATE, TRIGGER_GATE, TRIGGER_REQUEST};

#[embassy_executor::task]
pub async fn echo_task(mut ranger: EchoRanger<'static>, timeout_ms: u16) {
    info!("Echo task started");

    let window = Duration::from_millis(timeout_ms as u64);

    loop {
        TRIGGER_REQUEST.wait().await;

        if !gate_open(&TRIGGER_GATE) || !gate_open(&ECHO_GATE) {
            trace!("Trigger request with capture disabled");
            continue;
        }

        let event = match ranger.measure(window).await {
            Ok(pulse_us) => {
                trace!("Echo {} us", pulse_us);
                Event::EchoCaptured { pulse_us }
            }
            Err(e) => {
                debug!("Echo failed: {:?}", e);
                Event::EchoTimeout
            }
        };

        // A mode change may have closed the gate while measuring
        if gate_open(&ECHO_GATE) {
            post(&ECHO, event);
        }
    }
}
