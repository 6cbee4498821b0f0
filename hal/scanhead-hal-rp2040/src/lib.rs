//! RP2040-specific HAL for the scanhead sensor firmware
//!
//! This crate provides RP2040 drivers behind the shared `scanhead-hal`
//! traits, plus the pieces the firmware tasks use directly:
//!
//! - Segmented flash storage (implements `scanhead_hal::SegmentFlash`)
//! - Servo PWM at 50 Hz (implements `scanhead_hal::ServoPwm`)
//! - HC-SR04 style echo pulse measurement
//! - Paired light sensor conversions on the ADC

#![no_std]

pub mod adc;
pub mod echo;
pub mod flash;
pub mod servo;

pub use adc::LdrPair;
pub use echo::{EchoError, EchoRanger};
pub use flash::Rp2040SegmentFlash;
pub use servo::{servo_config, Rp2040Servo};
