//! Hardware sampling interpretation
//!
//! Converts raw capture values into the units the modes report: echo pulse
//! widths to centimeters, ADC counts to 10-bit light levels, servo angles to
//! pulse widths. Everything here saturates instead of failing.

pub mod echo;
pub mod ldr;
pub mod servo;

pub use echo::{distance_cm, timeout_distance_cm};
pub use ldr::{calibration_average, calibration_sample, light_level, LIGHT_LEVEL_MAX};
pub use servo::pulse_us;
