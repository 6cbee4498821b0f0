//! Sampling tick task
//!
//! Paces servo settling, sweep steps and script playback. Ticks are only
//! posted while the sampling timer is enabled.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use crate::channels::{gate_open, post, SAMPLING_GATE, TICK, TICK_RESET};

#[embassy_executor::task]
pub async fn tick_task(tick_ms: u16) {
    info!("Tick task started ({} ms)", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms.max(1) as u64));

    loop {
        match select(ticker.next(), TICK_RESET.wait()).await {
            Either::First(()) => {
                if gate_open(&SAMPLING_GATE) {
                    post(&TICK, ());
                }
            }
            Either::Second(()) => {
                trace!("Sampling tick restarted");
                ticker.reset();
            }
        }
    }
}
