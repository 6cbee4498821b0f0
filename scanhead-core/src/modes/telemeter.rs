//! Telemeter: repeated distance measurement at one angle

use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Ping, Progress};
use crate::link::HostCommand;
use crate::traits::SensorHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemeterMode {
    Idle,
    /// Pinging until stopped
    Tracking(Ping),
}

impl TelemeterMode {
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        use TelemeterMode::*;

        match (&mut *self, event) {
            (_, ModeEvent::Host(HostCommand::Track(angle))) => {
                *self = Tracking(Ping::start(io, angle));
            }
            (Idle, ModeEvent::Action(_)) => {
                let angle = io.config.telemeter.default_angle;
                *self = Tracking(Ping::start(io, angle));
            }
            (Tracking(_), ModeEvent::Action(_))
            | (_, ModeEvent::Host(HostCommand::StopTracking))
            | (_, ModeEvent::Host(HostCommand::Stop)) => *self = Idle,
            (Tracking(ping), event) => {
                if ping.handle(io, event) == Progress::Done {
                    let angle = ping.angle();
                    *ping = Ping::start(io, angle);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, Rig};
    use crate::state::Press;

    #[test]
    fn test_tracking_repeats() {
        let mut rig = Rig::new();
        let mut mode = TelemeterMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::Track(30)));

        for cm in [40, 41, 42] {
            mode.handle(&mut rig.io(), ModeEvent::Tick);
            mode.handle(&mut rig.io(), ModeEvent::Echo(cm));
        }
        assert_eq!(
            rig.tx.lines(),
            vec!["040", "030", "041", "030", "042", "030"]
        );
        assert_eq!(rig.head.count(Call::Fire), 3);
        assert!(matches!(mode, TelemeterMode::Tracking(_)));
    }

    #[test]
    fn test_action_toggles_at_default_angle() {
        let mut rig = Rig::new();
        let mut mode = TelemeterMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        match mode {
            TelemeterMode::Tracking(ping) => assert_eq!(ping.angle(), 90),
            _ => panic!("not tracking"),
        }
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        assert_eq!(mode, TelemeterMode::Idle);
    }

    #[test]
    fn test_stop_tracking() {
        let mut rig = Rig::new();
        let mut mode = TelemeterMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::Track(10)));
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::StopTracking));
        assert_eq!(mode, TelemeterMode::Idle);
    }

    #[test]
    fn test_retarget_while_tracking() {
        let mut rig = Rig::new();
        let mut mode = TelemeterMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::Track(10)));
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::Track(170)));
        match mode {
            TelemeterMode::Tracking(ping) => assert_eq!(ping.angle(), 170),
            _ => panic!("not tracking"),
        }
    }
}
