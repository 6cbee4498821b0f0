//! Servo PWM on an RP2040 PWM slice
//!
//! The slice counter is divided down to 1 MHz so compare values are pulse
//! widths in microseconds, with a 20 ms (50 Hz) frame.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config, Pwm};
use fixed::types::U12F4;

use scanhead_hal::ServoPwm;

/// Counter rate after the divider
const COUNTER_HZ: u32 = 1_000_000;

/// Servo frame period in counter ticks (20 ms)
pub const SERVO_PERIOD_US: u16 = 20_000;

/// Servo driven from channel B of a PWM slice
pub struct Rp2040Servo<'d> {
    pwm: Pwm<'d>,
    config: Config,
}

impl<'d> Rp2040Servo<'d> {
    /// Wrap a PWM slice already bound to the servo pin
    ///
    /// The output stays disabled until the first pulse is set.
    pub fn new(pwm: Pwm<'d>) -> Self {
        let mut servo = Self {
            pwm,
            config: servo_config(),
        };
        servo.disable_servo();
        servo
    }
}

/// Slice configuration for the servo frame, output disabled
pub fn servo_config() -> Config {
    let mut config = Config::default();
    let divider = (clk_sys_freq() / COUNTER_HZ).clamp(1, 255);
    config.divider = U12F4::from_num(divider);
    config.top = SERVO_PERIOD_US - 1;
    config.compare_b = 0;
    config.enable = false;
    config
}

impl ServoPwm for Rp2040Servo<'_> {
    fn set_servo_pulse(&mut self, pulse_us: u16) {
        self.config.compare_b = pulse_us.min(SERVO_PERIOD_US - 1);
        self.config.enable = true;
        self.pwm.set_config(&self.config);
    }

    fn disable_servo(&mut self) {
        self.config.compare_b = 0;
        self.config.enable = false;
        self.pwm.set_config(&self.config);
    }
}
