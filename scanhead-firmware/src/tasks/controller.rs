//! Main controller task
//!
//! Owns the dispatcher. On every wake the mailboxes are drained in a fixed
//! order: button, host bytes, echo, light sensors, tick. Each mailbox holds
//! at most one value, so a slow drain loses samples instead of queueing
//! stale ones.

use defmt::*;

use scanhead_core::dispatcher::Dispatcher;
use scanhead_core::state::{Event, SystemState};
use scanhead_hal_rp2040::Rp2040SegmentFlash;

use crate::board::{Board, LinkTx};
use crate::channels::{BUTTON, ECHO, HOST_RX, LDR, TICK, WAKE};

pub type SensorDispatcher = Dispatcher<Board, LinkTx, Rp2040SegmentFlash<'static>>;

#[embassy_executor::task]
pub async fn controller_task(mut dispatcher: SensorDispatcher) {
    info!("Controller task started in {:?}", dispatcher.state());

    loop {
        WAKE.wait().await;
        drain(&mut dispatcher);
    }
}

fn drain(dispatcher: &mut SensorDispatcher) {
    if let Some(button) = BUTTON.try_take() {
        if let Some(state) = dispatcher.handle_event(Event::Button(button)) {
            mode_changed(state);
        }
    }

    while let Ok(byte) = HOST_RX.try_receive() {
        if let Some(state) = dispatcher.handle_event(Event::HostByte(byte)) {
            mode_changed(state);
        }
    }

    if let Some(event) = ECHO.try_take() {
        dispatcher.handle_event(event);
    }

    if let Some(event) = LDR.try_take() {
        dispatcher.handle_event(event);
    }

    if TICK.try_take().is_some() {
        dispatcher.handle_event(Event::Tick);
    }
}

fn mode_changed(state: SystemState) {
    info!("Mode: {:?}", state);
    // Presses made during the hand-over are not carried into the new mode
    BUTTON.reset();
}
