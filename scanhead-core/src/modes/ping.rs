//! Point the servo and measure once

use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Progress};
use crate::telemetry::Field;
use crate::traits::SensorHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Settling(u8),
    AwaitEcho,
}

/// A single distance measurement at a fixed angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ping {
    angle: u8,
    phase: Phase,
}

impl Ping {
    pub fn start<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        io: &mut Io<'_, H, T, F>,
        angle: u8,
    ) -> Self {
        let angle = io.clamp_angle(angle);
        io.point(angle);
        Self {
            angle,
            phase: Phase::Settling(io.config.timing.settle_ticks.max(1)),
        }
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Fire after settling; report distance then angle on the echo
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) -> Progress {
        match (self.phase, event) {
            (Phase::Settling(ticks), ModeEvent::Tick) if ticks > 1 => {
                self.phase = Phase::Settling(ticks - 1);
                Progress::Running
            }
            (Phase::Settling(_), ModeEvent::Tick) => {
                io.head.fire();
                self.phase = Phase::AwaitEcho;
                Progress::Running
            }
            (Phase::AwaitEcho, ModeEvent::Echo(cm)) => {
                io.report(Field::Distance, cm);
                io.report(Field::Angle, self.angle as u16);
                Progress::Done
            }
            _ => Progress::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, Rig};

    #[test]
    fn test_ping_reports_distance_then_angle() {
        let mut rig = Rig::new();
        let mut ping = Ping::start(&mut rig.io(), 90);
        assert_eq!(rig.head.calls, vec![Call::ServoPulse(1450)]);

        // Echo before firing is stale
        assert_eq!(ping.handle(&mut rig.io(), ModeEvent::Echo(1)), Progress::Running);
        ping.handle(&mut rig.io(), ModeEvent::Tick);
        assert_eq!(rig.head.count(Call::Fire), 1);
        assert_eq!(ping.handle(&mut rig.io(), ModeEvent::Echo(57)), Progress::Done);

        assert_eq!(rig.tx.lines(), vec!["057", "090"]);
    }

    #[test]
    fn test_angle_clamped_to_travel() {
        let mut rig = Rig::new();
        let ping = Ping::start(&mut rig.io(), 250);
        assert_eq!(ping.angle(), 180);
    }
}
