//! Push-button handling
//!
//! Debounces one button and classifies each press as short or long. A
//! press is dropped if the controller has not yet taken the previous one.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level};
use embassy_time::{Duration, Timer};

use scanhead_core::config::ButtonConfig;
use scanhead_core::state::{Button, ButtonEvent, Press};

use crate::channels::{post, BUTTON};

/// Buttons are wired to ground with the internal pull-up
const PRESSED: Level = Level::Low;

#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut pin: Input<'static>, button: Button, timing: ButtonConfig) {
    info!("Button task started for {:?}", button);

    let debounce_delay = Duration::from_millis(timing.debounce_ms as u64);
    let hold = Duration::from_millis(timing.long_press_ms as u64);

    loop {
        if debounce(&mut pin, debounce_delay).await != PRESSED {
            continue;
        }

        let press = match select(Timer::after(hold), debounce(&mut pin, debounce_delay)).await {
            Either::First(()) => Press::Long,
            Either::Second(_) => Press::Short,
        };

        let event = ButtonEvent::new(button, press);
        if BUTTON.signaled() {
            debug!("Button mailbox busy, dropping {:?}", event);
        } else {
            debug!("Button: {:?}", event);
            post(&BUTTON, event);
        }

        if press == Press::Long {
            pin.wait_for_high().await;
            Timer::after(debounce_delay).await;
        }
    }
}

/// Wait for a level change that is still present after the debounce delay
async fn debounce(pin: &mut Input<'static>, delay: Duration) -> Level {
    loop {
        let start_level = pin.get_level();
        pin.wait_for_any_edge().await;
        Timer::after(delay).await;
        let end_level = pin.get_level();
        if start_level != end_level {
            break end_level;
        }
    }
}
