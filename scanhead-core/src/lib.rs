//! Board-agnostic core logic for the scanhead sensor firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Top-level dispatcher and hardware resource arbitration
//! - Mode state machines (object, telemeter, light, light+object, script)
//! - Sampling interpretation (echo distance, light level, servo pulse)
//! - Script directory, flash store and playback engine
//! - Telemetry formatting and host link decoding
//! - Configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatcher;
pub mod link;
pub mod modes;
pub mod sampling;
pub mod script;
pub mod state;
pub mod telemetry;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;
