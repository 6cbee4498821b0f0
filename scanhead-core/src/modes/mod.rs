//! Mode state machines
//!
//! Each operating mode owns a small sub-state machine. The dispatcher keeps
//! exactly one of them in [`ModeState`] and replaces it on every mode
//! change, so no mode ever sees another mode's leftovers.
//!
//! Modes act on the hardware only through [`Io`], which borrows the
//! dispatcher's collaborators for the duration of one event.

pub mod light;
pub mod light_object;
pub mod object;
pub mod ping;
pub mod script;
pub mod sweep;
pub mod telemeter;

pub use light::{Calibration, LightMode};
pub use light_object::LightObjectMode;
pub use object::ObjectMode;
pub use ping::Ping;
pub use script::{ScriptMode, ScriptPhase, Upload};
pub use sweep::{Sweep, SweepKind};
pub use telemeter::TelemeterMode;

use scanhead_hal::{ByteTx, SegmentFlash};

use crate::config::{CalibrationTable, SensorConfig};
use crate::link::HostCommand;
use crate::sampling;
use crate::script::ScriptStore;
use crate::state::{Press, SystemState};
use crate::telemetry::{self, Field};
use crate::traits::SensorHead;

/// Interpreted input for the active mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// Sampling tick
    Tick,
    /// Distance from an echo capture or timeout (cm)
    Echo(u16),
    /// Light levels of both sensors (10-bit)
    Light { ldr1: u16, ldr2: u16 },
    /// Action button, or the host's simulated press
    Action(Press),
    /// Host command not handled by the dispatcher itself
    Host(HostCommand),
}

/// Whether a sampling activity is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    Running,
    Done,
}

/// Collaborators lent to the active mode
pub struct Io<'a, H, T, F> {
    pub head: &'a mut H,
    pub tx: &'a mut T,
    pub flash: &'a mut F,
    pub config: &'a SensorConfig,
    pub scripts: &'a mut ScriptStore,
    pub calibration: &'a mut CalibrationTable,
}

impl<H: SensorHead, T: ByteTx, F: SegmentFlash> Io<'_, H, T, F> {
    /// Drive the servo to an angle
    pub fn point(&mut self, angle: u8) {
        let pulse = sampling::pulse_us(angle, &self.config.servo);
        self.head.set_servo_pulse(pulse);
    }

    /// Send one telemetry value
    pub fn report(&mut self, field: Field, value: u16) {
        telemetry::report(&mut *self.tx, field, value);
    }

    /// Clamp an angle into the servo travel
    pub fn clamp_angle(&self, angle: u8) -> u8 {
        angle.min(self.config.servo.max_angle)
    }
}

/// Sub-state of the active mode
#[derive(Debug)]
pub enum ModeState {
    Object(ObjectMode),
    Telemeter(TelemeterMode),
    Light(LightMode),
    LightObject(LightObjectMode),
    Script(ScriptMode),
}

impl ModeState {
    /// Fresh sub-state for a mode
    pub fn initial(state: SystemState) -> Self {
        match state {
            SystemState::ObjectDetector => ModeState::Object(ObjectMode::Idle),
            SystemState::Telemeter => ModeState::Telemeter(TelemeterMode::Idle),
            SystemState::LightDetector => ModeState::Light(LightMode::Idle),
            SystemState::LightObjectDetector => ModeState::LightObject(LightObjectMode::Idle),
            SystemState::Script => ModeState::Script(ScriptMode::new()),
        }
    }

    /// The mode this sub-state belongs to
    pub fn system_state(&self) -> SystemState {
        match self {
            ModeState::Object(_) => SystemState::ObjectDetector,
            ModeState::Telemeter(_) => SystemState::Telemeter,
            ModeState::Light(_) => SystemState::LightDetector,
            ModeState::LightObject(_) => SystemState::LightObjectDetector,
            ModeState::Script(_) => SystemState::Script,
        }
    }

    /// Check if the mode is idle, waiting for a command
    pub fn is_idle(&self) -> bool {
        match self {
            ModeState::Object(m) => matches!(m, ObjectMode::Idle),
            ModeState::Telemeter(m) => matches!(m, TelemeterMode::Idle),
            ModeState::Light(m) => matches!(m, LightMode::Idle),
            ModeState::LightObject(m) => matches!(m, LightObjectMode::Idle),
            ModeState::Script(m) => matches!(m.phase, ScriptPhase::Browsing),
        }
    }

    /// Route an event to the active mode
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        match self {
            ModeState::Object(m) => m.handle(io, event),
            ModeState::Telemeter(m) => m.handle(io, event),
            ModeState::Light(m) => m.handle(io, event),
            ModeState::LightObject(m) => m.handle(io, event),
            ModeState::Script(m) => m.handle(io, event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_matches_state() {
        for state in SystemState::ALL {
            let mode = ModeState::initial(state);
            assert_eq!(mode.system_state(), state);
            assert!(mode.is_idle());
        }
    }
}
