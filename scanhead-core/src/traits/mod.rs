//! Collaborator bundles used by the dispatcher
//!
//! The individual hardware traits live in `scanhead-hal`.

pub mod head;

pub use head::SensorHead;
