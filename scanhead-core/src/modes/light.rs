//! Light detector: light sweep and sensor calibration
//!
//! A calibration session records one reference point per Action press.
//! Each press takes a single ADC conversion of both sensors; the averaged
//! 8-bit value is written to the calibration table at the current index.
//! After the tenth point the completion marker is written and the mode
//! returns to idle. The readout shows the reference distance of the point
//! waiting to be taken.

use scanhead_hal::{ByteTx, FlashError, SegmentFlash};

use super::{Io, ModeEvent, Progress, Sweep, SweepKind};
use crate::config::{CalibrationTable, CALIBRATION_POINTS};
use crate::link::HostCommand;
use crate::sampling::{calibration_average, calibration_sample};
use crate::state::Press;
use crate::traits::SensorHead;

/// Calibration session progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Next point to record
    pub index: usize,
    /// A conversion was requested and not yet delivered
    pub converting: bool,
}

impl Calibration {
    /// Erase the table and start at the first point
    pub fn begin<F: SegmentFlash>(
        table: &mut CalibrationTable,
        flash: &mut F,
    ) -> Result<Self, FlashError> {
        table.begin_session(flash)?;
        Ok(Self {
            index: 0,
            converting: false,
        })
    }

    /// Store the average of two 8-bit samples at the current index
    ///
    /// Returns the stored value. After the last point the completion marker
    /// is written as well and `Done` is reported.
    pub fn record<F: SegmentFlash>(
        &mut self,
        table: &mut CalibrationTable,
        flash: &mut F,
        sample1: u8,
        sample2: u8,
    ) -> Result<(u8, Progress), FlashError> {
        let avg_sample = calibration_average(sample1, sample2);
        table.commit_point(flash, self.index, avg_sample)?;
        self.index += 1;
        self.converting = false;

        if self.index < CALIBRATION_POINTS {
            return Ok((avg_sample, Progress::Running));
        }
        table.finish_session(flash)?;
        Ok((avg_sample, Progress::Done))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightMode {
    Idle,
    Sweeping(Sweep),
    Calibrating(Calibration),
}

impl LightMode {
    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        use LightMode::*;

        match (&mut *self, event) {
            (Idle, ModeEvent::Action(Press::Short))
            | (Idle, ModeEvent::Host(HostCommand::StartLightScan)) => {
                let range = io.config.sweep;
                *self = Sweeping(Sweep::start(io, SweepKind::Light, range.from, range.to));
            }
            (Idle, ModeEvent::Action(Press::Long))
            | (Idle, ModeEvent::Host(HostCommand::StartCalibration)) => {
                *self = match Calibration::begin(io.calibration, io.flash) {
                    Ok(session) => {
                        show_point(io, session.index);
                        Calibrating(session)
                    }
                    Err(_) => Idle,
                };
            }
            (_, ModeEvent::Host(HostCommand::Stop)) => *self = Idle,
            (Sweeping(sweep), event) => {
                if sweep.handle(io, event) == Progress::Done {
                    *self = Idle;
                }
            }
            (Calibrating(session), ModeEvent::Action(_)) if !session.converting => {
                io.head.start_conversion();
                session.converting = true;
            }
            (Calibrating(session), ModeEvent::Light { ldr1, ldr2 }) if session.converting => {
                let sample1 = calibration_sample(ldr1);
                let sample2 = calibration_sample(ldr2);
                match session.record(io.calibration, io.flash, sample1, sample2) {
                    Ok((_, Progress::Running)) => show_point(io, session.index),
                    Ok((_, Progress::Done)) | Err(_) => *self = Idle,
                }
            }
            _ => {}
        }
    }
}

fn show_point<H: SensorHead, T: ByteTx, F: SegmentFlash>(io: &mut Io<'_, H, T, F>, index: usize) {
    if let Some(cm) = CalibrationTable::point_distance_cm(index) {
        io.head.show_number(cm as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CALIBRATION_COMPLETE;
    use crate::mock::{Call, Rig};

    #[test]
    fn test_record_averages_samples() {
        let mut rig = Rig::new();
        let mut session = Calibration::begin(&mut rig.calibration, &mut rig.flash).unwrap();
        session.index = 4;

        let (avg, progress) = session
            .record(&mut rig.calibration, &mut rig.flash, 100, 102)
            .unwrap();
        assert_eq!(avg, 101);
        assert_eq!(progress, Progress::Running);
        assert_eq!(rig.calibration.get(4), Some(101));
        assert_eq!(session.index, 5);
    }

    #[test]
    fn test_full_calibration_session() {
        let mut rig = Rig::new();
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Long));
        assert!(matches!(mode, LightMode::Calibrating(_)));

        for i in 0..CALIBRATION_POINTS as u16 {
            mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
            // 10-bit levels reduce to 8-bit samples
            mode.handle(
                &mut rig.io(),
                ModeEvent::Light {
                    ldr1: 400 + 4 * i,
                    ldr2: 408 + 4 * i,
                },
            );
        }

        assert_eq!(mode, LightMode::Idle);
        assert_eq!(rig.head.count(Call::StartConversion), CALIBRATION_POINTS);
        assert_eq!(
            rig.calibration.points(),
            &[101, 102, 103, 104, 105, 106, 107, 108, 109, 110]
        );
        assert_eq!(rig.calibration.get(10), Some(CALIBRATION_COMPLETE));
    }

    #[test]
    fn test_readout_shows_next_reference_distance() {
        let mut rig = Rig::new();
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::StartCalibration));
        assert_eq!(rig.head.count(Call::ShowNumber(5)), 1);

        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 400, ldr2: 400 });
        assert_eq!(rig.head.count(Call::ShowNumber(10)), 1);

        for _ in 1..CALIBRATION_POINTS {
            mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
            mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 400, ldr2: 400 });
        }
        assert_eq!(rig.head.count(Call::ShowNumber(50)), 1);
        assert_eq!(rig.head.count(Call::ShowNumber(55)), 0);
    }

    #[test]
    fn test_saturated_conversion_still_records() {
        let mut rig = Rig::new();
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::StartCalibration));
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 1023, ldr2: 1023 });

        // The session accepts the next press
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        assert_eq!(rig.head.count(Call::StartConversion), 2);
        assert_eq!(rig.calibration.get(0), Some(255));
    }

    #[test]
    fn test_one_conversion_per_press() {
        let mut rig = Rig::new();
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::StartCalibration));
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        assert_eq!(rig.head.count(Call::StartConversion), 1);

        // Conversion results without a press are ignored
        mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 8, ldr2: 8 });
        mode.handle(&mut rig.io(), ModeEvent::Light { ldr1: 8, ldr2: 8 });
        match mode {
            LightMode::Calibrating(session) => assert_eq!(session.index, 1),
            _ => panic!("session ended"),
        }
    }

    #[test]
    fn test_short_press_sweeps() {
        let mut rig = Rig::new();
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Action(Press::Short));
        assert!(matches!(mode, LightMode::Sweeping(_)));
    }

    #[test]
    fn test_erase_failure_stays_idle() {
        let mut rig = Rig::new();
        rig.flash.fail_erase(true);
        let mut mode = LightMode::Idle;
        mode.handle(&mut rig.io(), ModeEvent::Host(HostCommand::StartCalibration));
        assert_eq!(mode, LightMode::Idle);
    }
}
