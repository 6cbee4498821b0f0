//! Configuration
//!
//! Behavior settings parsed from `sensor.toml`, the persisted flash layout
//! and the light sensor calibration table.

pub mod calibration;
pub mod layout;
pub mod parse;
pub mod types;

pub use calibration::*;
pub use layout::*;
pub use parse::{parse_config, ParseError};
pub use types::*;
