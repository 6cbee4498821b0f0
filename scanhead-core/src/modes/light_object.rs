//! Light and object detector: distance plus light levels per step

use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Progress, Sweep, SweepKind};
use crate::link::HostCommand;
use crate::traits::SensorHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightObjectMode {
    Idle,
    Sweeping(Sweep),
}

impl LightObjectMode {
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        use LightObjectMode::*;

        match (&mut *self, event) {
            (Idle, ModeEvent::Action(_))
            | (Idle, ModeEvent::Host(HostCommand::StartLightObjectScan)) => {
                let range = io.config.sweep;
                *self = Sweeping(Sweep::start(
                    io,
                    SweepKind::DistanceAndLight,
                    range.from,
                    range.to,
                ));
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

    #[test]
    fn test_each_step_samples_both() {
        let mut rig = Rig::new();
        rig.config.sweep = crate::config::SweepConfig {
            from: 0,
            to: 10,
            step: 10,
        };
        let mut mode = LightObjectMode::Idle;
        mode.handle(
            &mut rig.io(),
            ModeEvent::Host(HostCommand::StartLightObjectScan),
        );

        while matches!(mode, LightObjectMode::Sweeping(_)) {
            mode.handle(&mut rig.io(), ModeEvent::Tick);
            mode.handle(&mut rig.io(), ModeEvent::Echo(20));
            mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 5, ldr2: 6 });
        }

        assert_eq!(rig.head.count(Call::Fire), 2);
        assert_eq!(rig.head.count(Call::StartConversion), 2);
        assert_eq!(
            rig.tx.lines(),
            vec!["000", "010", "020", "0005", "0006", "020", "0005", "0006", "9999"]
        );
    }
}
