//! Ultrasonic echo measurement
//!
//! HC-SR04 ranger driven through `hcsr04_async`. The driver reports a
//! distance; the core works on round-trip pulse widths, so the result is
//! scaled back with the configured microseconds per centimetre.

use embassy_rp::gpio::{Input, Output};
use embassy_time::{with_timeout, Duration};
use hcsr04_async::{Config, DistanceUnit, Hcsr04, TemperatureUnit};

/// Fixed ambient temperature for the speed of sound (°C)
const TEMPERATURE: f64 = 20.0;

/// Echo measurement failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoError {
    /// Driver gave up without a usable echo
    NoEcho,
    /// No result inside the capture window
    Overrange,
}

/// Trigger/echo pin pair
pub struct EchoRanger<'d> {
    sensor: Hcsr04<Output<'d>, Input<'d>>,
    us_per_cm: u16,
}

impl<'d> EchoRanger<'d> {
    pub fn new(trigger: Output<'d>, echo: Input<'d>, us_per_cm: u16) -> Self {
        let config = Config {
            distance_unit: DistanceUnit::Centimeters,
            temperature_unit: TemperatureUnit::Celsius,
        };
        Self {
            sensor: Hcsr04::new(trigger, echo, config),
            us_per_cm,
        }
    }

    /// Fire once and return the echo pulse width in microseconds
    ///
    /// `window` bounds the whole measurement.
    pub async fn measure(&mut self, window: Duration) -> Result<u32, EchoError> {
        let cm = with_timeout(window, self.sensor.measure(TEMPERATURE))
            .await
            .map_err(|_| EchoError::Overrange)?
            .map_err(|_| EchoError::NoEcho)?;

        if !cm.is_finite() || cm < 0.0 {
            return Err(EchoError::NoEcho);
        }
        Ok((cm * self.us_per_cm as f64) as u32)
    }
}
