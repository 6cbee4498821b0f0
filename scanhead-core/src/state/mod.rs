//! Top-level operating state
//!
//! Exactly one of the five modes is active at any time. The dispatcher owns
//! the value and changes it only on confirmed button events.

pub mod events;
pub mod machine;

pub use events::{Button, ButtonEvent, Event, Press};
pub use machine::SystemState;
