//! Inter-task communication channels
//!
//! Capture tasks post into single-slot mailboxes and then signal [`WAKE`].
//! The controller drains the mailboxes in a fixed order on every wake.
//! Host bytes are a stream and use bounded channels instead.
//!
//! The gates are set and cleared by the board when the dispatcher enables
//! or disables a resource. Capture tasks check them before posting.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

use scanhead_core::state::{ButtonEvent, Event};

/// Channel capacity for bytes received from the host
const HOST_RX_SIZE: usize = 64;

/// Channel capacity for telemetry bytes
const HOST_TX_SIZE: usize = 128;

/// Something was posted for the controller
pub static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Sampling tick elapsed
pub static TICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Echo capture result (`EchoCaptured` or `EchoTimeout`)
pub static ECHO: Signal<CriticalSectionRawMutex, Event> = Signal::new();

/// Light sensor result (`LdrSampled` or `LdrFailed`)
pub static LDR: Signal<CriticalSectionRawMutex, Event> = Signal::new();

/// Debounced button press
pub static BUTTON: Signal<CriticalSectionRawMutex, ButtonEvent> = Signal::new();

/// Bytes received from the host
pub static HOST_RX: Channel<CriticalSectionRawMutex, u8, HOST_RX_SIZE> = Channel::new();

/// Telemetry bytes waiting for the UART
pub static HOST_TX: Channel<CriticalSectionRawMutex, u8, HOST_TX_SIZE> = Channel::new();

/// Fire the ranger once
pub static TRIGGER_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Convert both light sensors once
pub static CONVERSION_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Restart the sampling ticker from zero
pub static TICK_RESET: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Sampling timer running
pub static SAMPLING_GATE: AtomicBool = AtomicBool::new(false);

/// Echo capture timer running
pub static ECHO_GATE: AtomicBool = AtomicBool::new(false);

/// Light sensor channels configured
pub static ADC_GATE: AtomicBool = AtomicBool::new(false);

/// Trigger output configured
pub static TRIGGER_GATE: AtomicBool = AtomicBool::new(false);

/// Check a resource gate
pub fn gate_open(gate: &AtomicBool) -> bool {
    gate.load(Ordering::Acquire)
}

/// Open or close a resource gate
pub fn set_gate(gate: &AtomicBool, open: bool) {
    gate.store(open, Ordering::Release);
}

/// Post into a mailbox and wake the controller
pub fn post<T>(mailbox: &Signal<CriticalSectionRawMutex, T>, value: T) {
    mailbox.signal(value);
    WAKE.signal(());
}
