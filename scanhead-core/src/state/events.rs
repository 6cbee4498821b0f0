//! Events consumed by the dispatcher
//!
//! Each variant corresponds to one interrupt source. Capture code produces
//! them; all branching happens in the dispatcher.

/// Physical push-buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Cycles the operating mode
    Advance,
    /// Starts/stops the active mode's activity
    Action,
}

/// Press duration class, decided by the debounce task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    Short,
    Long,
}

/// A debounced button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: Button,
    pub press: Press,
}

impl ButtonEvent {
    pub const fn new(button: Button, press: Press) -> Self {
        Self { button, press }
    }

    pub const fn advance() -> Self {
        Self::new(Button::Advance, Press::Short)
    }

    pub const fn action(press: Press) -> Self {
        Self::new(Button::Action, press)
    }
}

/// Dispatcher input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Sampling timer period elapsed
    Tick,
    /// Echo pulse captured, width in microseconds
    EchoCaptured { pulse_us: u32 },
    /// No echo within the capture window
    EchoTimeout,
    /// Conversion of both light sensors finished (raw ADC counts)
    LdrSampled { ldr1: u16, ldr2: u16 },
    /// Conversion requested but no result came back
    LdrFailed,
    /// Debounced button press
    Button(ButtonEvent),
    /// Byte received from the host link
    HostByte(u8),
}
