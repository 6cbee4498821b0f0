//! Script execution engine
//!
//! Playback runs off the sampling tick. With no instruction in progress a
//! tick fetches the next record, echoes its opcode and starts it. Servo
//! instructions reuse the [`Ping`] and [`Sweep`] machines of the live modes,
//! readout instructions count down the step delay between updates.
//!
//! Malformed records are skipped within the same tick. A trailing partial
//! record ends playback.

use scanhead_hal::readout::READOUT_CELLS;
use scanhead_hal::{ByteTx, SegmentFlash};

use super::instruction::{Instruction, Opcode, RECORD_LEN};
use crate::modes::{Io, ModeEvent, Ping, Progress, Sweep, SweepKind};
use crate::telemetry::Field;
use crate::traits::SensorHead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Activity {
    /// Ready for the next record
    Fetch,
    /// Readout counting towards `last`
    Counting {
        value: u16,
        last: u16,
        wait: u16,
    },
    /// Character moving right across the readout
    Rotating { ch: u8, position: u8, wait: u16 },
    Ping(Ping),
    Sweep(Sweep),
    Finished,
}

/// Playback of one stored script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Player {
    index: usize,
    offset: u32,
    delay_ticks: u16,
    activity: Activity,
}

impl Player {
    /// Prepare playback of the script at a directory index
    ///
    /// Returns `None` for an index with no script.
    pub fn start<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        io: &mut Io<'_, H, T, F>,
        index: usize,
    ) -> Option<Self> {
        io.scripts.directory().get(index)?;
        let timing = io.config.timing;
        Some(Self {
            index,
            offset: 0,
            delay_ticks: timing.delay_ticks(timing.default_delay_ms as u32),
            activity: Activity::Fetch,
        })
    }

    /// Directory index being played
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current step delay in ticks
    pub fn delay_ticks(&self) -> u16 {
        self.delay_ticks
    }

    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) -> Progress {
        match (&mut self.activity, event) {
            (Activity::Finished, _) => return Progress::Done,
            (Activity::Fetch, ModeEvent::Tick) => self.fetch(io),
            (Activity::Ping(ping), event) => {
                if ping.handle(io, event) == Progress::Done {
                    self.activity = Activity::Fetch;
                }
            }
            (Activity::Sweep(sweep), event) => {
                if sweep.handle(io, event) == Progress::Done {
                    self.activity = Activity::Fetch;
                }
            }
            (Activity::Counting { value, last, wait }, ModeEvent::Tick) => {
                *wait = wait.saturating_sub(1);
                if *wait == 0 {
                    if *value == *last {
                        self.activity = Activity::Fetch;
                    } else {
                        *value = if *value < *last { *value + 1 } else { *value - 1 };
                        *wait = self.delay_ticks;
                        io.head.show_number(*value);
                    }
                }
            }
            (Activity::Rotating { ch, position, wait }, ModeEvent::Tick) => {
                *wait = wait.saturating_sub(1);
                if *wait == 0 {
                    if *position + 1 >= READOUT_CELLS {
                        io.head.clear();
                        self.activity = Activity::Fetch;
                    } else {
                        *position += 1;
                        *wait = self.delay_ticks;
                        io.head.show_char(*position, *ch);
                    }
                }
            }
            _ => {}
        }

        if self.activity == Activity::Finished {
            Progress::Done
        } else {
            Progress::Running
        }
    }

    fn fetch<H: SensorHead, T: ByteTx, F: SegmentFlash>(&mut self, io: &mut Io<'_, H, T, F>) {
        let mut record = [0u8; RECORD_LEN];
        loop {
            let read = io
                .scripts
                .read_script(io.flash, self.index, self.offset, &mut record);
            let n = match read {
                Ok(n) if n == RECORD_LEN => n,
                // End of script, trailing partial record or read failure
                _ => {
                    self.activity = Activity::Finished;
                    return;
                }
            };
            self.offset += n as u32;

            if let Ok(instruction) = Instruction::parse(&record) {
                io.report(Field::Opcode, instruction.opcode.code() as u16);
                self.execute(io, instruction);
                return;
            }
        }
    }

    fn execute<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        instruction: Instruction,
    ) {
        self.activity = match instruction.opcode {
            Opcode::CountUp => {
                io.head.show_number(0);
                Activity::Counting {
                    value: 0,
                    last: instruction.arg1,
                    wait: self.delay_ticks,
                }
            }
            Opcode::CountDown => {
                io.head.show_number(instruction.arg1);
                Activity::Counting {
                    value: instruction.arg1,
                    last: 0,
                    wait: self.delay_ticks,
                }
            }
            Opcode::RotateRight => {
                let ch = instruction.arg1_u8();
                io.head.show_char(0, ch);
                Activity::Rotating {
                    ch,
                    position: 0,
                    wait: self.delay_ticks,
                }
            }
            Opcode::SetDelay => {
                self.delay_ticks = io.config.timing.delay_ticks(instruction.arg1 as u32 * 10);
                Activity::Fetch
            }
            Opcode::ClearReadout => {
                io.head.clear();
                Activity::Fetch
            }
            Opcode::ServoTo => Activity::Ping(Ping::start(io, instruction.arg1_u8())),
            Opcode::ServoScan => Activity::Sweep(Sweep::start(
                io,
                SweepKind::Distance,
                instruction.arg1_u8(),
                instruction.arg2_u8(),
            )),
            Opcode::Sleep => Activity::Finished,
        };
    }
}
