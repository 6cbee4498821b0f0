//! Board glue
//!
//! Implements the `scanhead-hal` traits for the Pico wiring. The servo is
//! driven directly; every other resource is a gate plus a request signal
//! serviced by its capture task.
//!
//! | Function       | Pin    | Peripheral        |
//! |----------------|--------|-------------------|
//! | Host TX / RX   | 0 / 1  | UART0             |
//! | Echo           | 13     | GPIO input        |
//! | Trigger        | 14     | GPIO output       |
//! | Servo          | 15     | PWM slice 7 B     |
//! | Advance button | 16     | GPIO, active low  |
//! | Action button  | 17     | GPIO, active low  |
//! | LDR 1 / LDR 2  | 26 / 27| ADC0 / ADC1       |

use defmt::*;

use scanhead_hal::{
    ByteTx, EchoTrigger, InterruptMask, LdrAdc, LdrChannel, Readout, SamplingTimers, ServoPwm,
    TimerId,
};
use scanhead_hal_rp2040::Rp2040Servo;

use crate::channels::{
    set_gate, gate_open, ADC_GATE, CONVERSION_REQUEST, ECHO, ECHO_GATE, HOST_TX, LDR,
    SAMPLING_GATE, TICK, TICK_RESET, TRIGGER_GATE, TRIGGER_REQUEST,
};

/// Sensor head as seen by the dispatcher
pub struct Board {
    servo: Rp2040Servo<'static>,
    channels: u8,
}

impl Board {
    pub fn new(servo: Rp2040Servo<'static>) -> Self {
        Self { servo, channels: 0 }
    }
}

fn channel_bit(channel: LdrChannel) -> u8 {
    match channel {
        LdrChannel::Ldr1 => 1 << 0,
        LdrChannel::Ldr2 => 1 << 1,
    }
}

impl SamplingTimers for Board {
    fn enable_timer(&mut self, timer: TimerId) {
        trace!("Enable {:?}", timer);
        match timer {
            TimerId::Sampling => set_gate(&SAMPLING_GATE, true),
            TimerId::EchoCapture => set_gate(&ECHO_GATE, true),
        }
    }

    fn disable_timer(&mut self, timer: TimerId) {
        trace!("Disable {:?}", timer);
        // Drop anything captured before the gate closed
        match timer {
            TimerId::Sampling => {
                set_gate(&SAMPLING_GATE, false);
                TICK.reset();
            }
            TimerId::EchoCapture => {
                set_gate(&ECHO_GATE, false);
                ECHO.reset();
            }
        }
    }

    fn reset_timer(&mut self, timer: TimerId) {
        match timer {
            TimerId::Sampling => {
                TICK.reset();
                TICK_RESET.signal(());
            }
            TimerId::EchoCapture => ECHO.reset(),
        }
    }
}

impl LdrAdc for Board {
    fn configure_channel(&mut self, channel: LdrChannel) {
        self.channels |= channel_bit(channel);
        let all = LdrChannel::ALL
            .iter()
            .all(|&c| self.channels & channel_bit(c) != 0);
        set_gate(&ADC_GATE, all);
    }

    fn disable_adc(&mut self) {
        self.channels = 0;
        set_gate(&ADC_GATE, false);
        CONVERSION_REQUEST.reset();
        LDR.reset();
    }

    fn start_conversion(&mut self) {
        if gate_open(&ADC_GATE) {
            CONVERSION_REQUEST.signal(());
        } else {
            warn!("Conversion requested with the ADC disabled");
        }
    }
}

impl ServoPwm for Board {
    fn set_servo_pulse(&mut self, pulse_us: u16) {
        trace!("Servo pulse {} us", pulse_us);
        self.servo.set_servo_pulse(pulse_us);
    }

    fn disable_servo(&mut self) {
        self.servo.disable_servo();
    }
}

impl EchoTrigger for Board {
    fn enable_trigger(&mut self) {
        set_gate(&TRIGGER_GATE, true);
    }

    fn disable_trigger(&mut self) {
        set_gate(&TRIGGER_GATE, false);
        TRIGGER_REQUEST.reset();
    }

    fn fire(&mut self) {
        if gate_open(&TRIGGER_GATE) {
            TRIGGER_REQUEST.signal(());
        } else {
            warn!("Trigger fired while disabled");
        }
    }
}

impl InterruptMask for Board {
    fn with_interrupts_masked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        cortex_m::interrupt::free(|_| f(self))
    }
}

/// The board has no character display; readout goes to the debug log
impl Readout for Board {
    fn show_number(&mut self, value: u16) {
        info!("Readout: {}", value);
    }

    fn show_char(&mut self, position: u8, ch: u8) {
        info!("Readout[{}]: {}", position, ch as char);
    }

    fn clear(&mut self) {
        debug!("Readout cleared");
    }
}

/// Telemetry sink feeding the UART TX task
pub struct LinkTx;

impl ByteTx for LinkTx {
    fn send_char(&mut self, byte: u8) {
        if HOST_TX.try_send(byte).is_err() {
            warn!("Host TX queue full, dropping byte");
        }
    }
}
