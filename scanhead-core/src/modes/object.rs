//! Object detector: distance sweep over the configured range

use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Progress, Sweep, SweepKind};
use crate::link::HostCommand;
use crate::traits::SensorHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObjectMode {
    Idle,
    Sweeping(Sweep),
}

impl ObjectMode {
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        use ObjectMode::*;

        match (&mut *self, event) {
            (Idle, ModeEvent::Action(_)) | (Idle, ModeEvent::Host(HostCommand::StartObjectScan)) => {
                let range = io.config.sweep;
                *self = Sweeping(Sweep::start(io, SweepKind::Distance, range.from, range.to));
            }
            (_, ModeEvent::Host(HostCommand::Stop)) => *self = Idle,
            (Sweeping(sweep), event) => {
                if sweep.handle(io, event) == Progress::Done {
                    *self = Idle;
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
    fn test_action_starts_full_sweep() {
        let mut rig = Rig::new();
        let mut mode = ObjectMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        assert!(matches!(mode, ObjectMode::Sweeping(_)));
        assert_eq!(rig.tx.lines(), vec!["000", "180"]);
    }

    #[test]
    fn test_full_sweep_step_count() {
        let mut rig = Rig::new();
        let mut mode = ObjectMode::Idle;
        mode.handle(
            &mut rig.io(),
            ModeEvent::Host(HostCommand::StartObjectScan),
        );

        let mut steps = 0;
        while matches!(mode, ObjectMode::Sweeping(_)) {
            mode.handle(&mut rig.io(), ModeEvent::Tick);
            mode.handle(&mut rig.io(), ModeEvent::Echo(100));
            steps += 1;
        }
        // 0..=180 in steps of 3
        assert_eq!(steps, 61);
        assert_eq!(rig.head.count(Call::Fire), 61);
        assert_eq!(rig.tx.lines().last().map(String::as_str), Some("500"));
    }

    #[test]
    fn test_stop_returns_to_idle() {
        let mut rig = Rig::new();
        let mut mode = ObjectMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::Stop));
        assert_eq!(mode, ObjectMode::Idle);

        // Ticks in idle do nothing
        rig.head.take();
        mode.handle(&mut rig.io(), ModeEvent::Tick);
        assert!(rig.head.calls.is_empty());
    }
}
