//! Servo sweep with per-step sampling
//!
//! ```text
//! start ──► Settling ──tick──► AwaitEcho ──echo──┐
//!              ▲        │                        │
//!              │        └────► AwaitLight ─light─┤
//!              │                                 ▼
//!              └──────────── point(next) ◄── report
//! ```
//!
//! The last step is always taken at `to`, even when the step size does not
//! divide the range. After it the end sentinel is reported.

use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Progress};
use crate::telemetry::{Field, LIGHT_OBJECT_SWEEP_END, LIGHT_SWEEP_END, OBJECT_SWEEP_END};
use crate::traits::SensorHead;

/// What each step samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepKind {
    /// One distance per step
    Distance,
    /// Both light sensors per step
    Light,
    /// Distance, then both light sensors
    DistanceAndLight,
}

impl SweepKind {
    fn sentinel(self) -> (Field, u16) {
        match self {
            SweepKind::Distance => (Field::Distance, OBJECT_SWEEP_END),
            SweepKind::Light => (Field::Light, LIGHT_SWEEP_END),
            SweepKind::DistanceAndLight => (Field::Distance, LIGHT_OBJECT_SWEEP_END),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// Ticks left before sampling
    Settling(u8),
    AwaitEcho,
    AwaitLight,
}

/// A running sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sweep {
    kind: SweepKind,
    angle: u8,
    to: u8,
    step: u8,
    phase: Phase,
}

impl Sweep {
    /// Point at `from`, announce the range and start settling
    ///
    /// Angles are clamped to the servo travel; a reversed range is swapped.
    pub fn start<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        io: &mut Io<'_, H, T, F>,
        kind: SweepKind,
        from: u8,
        to: u8,
    ) -> Self {
        let (from, to) = (io.clamp_angle(from), io.clamp_angle(to));
        let (from, to) = if from <= to { (from, to) } else { (to, from) };

        io.point(from);
        io.report(Field::Angle, from as u16);
        io.report(Field::Angle, to as u16);

        Self {
            kind,
            angle: from,
            to,
            step: io.config.sweep.step.max(1),
            phase: Phase::Settling(io.config.timing.settle_ticks.max(1)),
        }
    }

    pub fn kind(&self) -> SweepKind {
        self.kind
    }

    /// Current servo angle
    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Advance on a sampling event
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
                self.sample(io);
                Progress::Running
            }
            (Phase::AwaitEcho, ModeEvent::Echo(cm)) => {
                io.report(Field::Distance, cm);
                match self.kind {
                    SweepKind::DistanceAndLight => {
                        io.head.start_conversion();
                        self.phase = Phase::AwaitLight;
                        Progress::Running
                    }
                    _ => self.advance(io),
                }
            }
            (Phase::AwaitLight, ModeEvent::Light { ldr1, ldr2 }) => {
                io.report(Field::Light, ldr1);
                io.report(Field::Light, ldr2);
                self.advance(io)
            }
            _ => Progress::Running,
        }
    }

    fn sample<H: SensorHead, T: ByteTx, F: SegmentFlash>(&mut self, io: &mut Io<'_, H, T, F>) {
        match self.kind {
            SweepKind::Distance | SweepKind::DistanceAndLight => {
                io.head.fire();
                self.phase = Phase::AwaitEcho;
            }
            SweepKind::Light => {
                io.head.start_conversion();
                self.phase = Phase::AwaitLight;
            }
        }
    }

    fn advance<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
    ) -> Progress {
        if self.angle >= self.to {
            let (field, sentinel) = self.kind.sentinel();
            io.report(field, sentinel);
            return Progress::Done;
        }

        self.angle = self.angle.saturating_add(self.step).min(self.to);
        io.point(self.angle);
        self.phase = Phase::Settling(io.config.timing.settle_ticks.max(1));
        Progress::Running
    }
}
