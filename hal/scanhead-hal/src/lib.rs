//! Scanhead Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the scanhead core drives:
//! timers, the light-sensor ADC, servo and trigger outputs, the interrupt
//! mask, the host byte sink, the character readout and the segmented flash.
//! Chip-specific crates implement them; the core never touches registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  scanhead-firmware (tasks, board glue)  │
//! └─────────────────────────────────────────┘
//!          │                    │
//!          ▼                    ▼
//! ┌─────────────────┐  ┌─────────────────────┐
//! │  scanhead-core  │  │ scanhead-hal-rp2040 │
//! └─────────────────┘  └─────────────────────┘
//!          │                    │
//!          └─────────┬──────────┘
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │  scanhead-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timer::SamplingTimers`] - Sampling tick and echo capture timers
//! - [`adc::LdrAdc`] - Light sensor conversions
//! - [`pwm::ServoPwm`], [`pwm::EchoTrigger`] - Servo and ranger trigger
//! - [`irq::InterruptMask`] - Atomic resource hand-over
//! - [`uart::ByteTx`] - Telemetry byte transmission
//! - [`readout::Readout`] - Character/number readout
//! - [`flash::SegmentFlash`] - Sequential and indexed flash writes

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod irq;
pub mod pwm;
pub mod readout;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::{LdrAdc, LdrChannel};
pub use flash::{FlashError, SegmentFlash};
pub use irq::InterruptMask;
pub use pwm::{EchoTrigger, ServoPwm};
pub use readout::Readout;
pub use timer::{SamplingTimers, TimerId};
pub use uart::ByteTx;
