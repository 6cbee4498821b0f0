//! Script mode: upload, selection and playback
//!
//! Uploads are buffered in RAM while the host streams them and only touch
//! flash once the name terminator arrives. An oversized body, a bad name or
//! any store error drops the upload without an acknowledgement.

use heapless::Vec;
use scanhead_hal::{ByteTx, SegmentFlash};

use super::{Io, ModeEvent, Progress};
use crate::link::HostCommand;
use crate::script::{Player, StoreError, MAX_NAME_LEN};
use crate::state::Press;
use crate::telemetry;
use crate::traits::SensorHead;

/// Largest script body accepted over the link
pub const UPLOAD_BUFFER_LEN: usize = 64;

/// A script being received from the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Upload {
    /// Host slot the upload was addressed to
    pub slot: u8,
    body: Vec<u8, UPLOAD_BUFFER_LEN>,
    name: Vec<u8, MAX_NAME_LEN>,
    overflow: bool,
    name_overflow: bool,
}

impl Upload {
    pub fn new(slot: u8, len: u8) -> Self {
        Self {
            slot,
            body: Vec::new(),
            name: Vec::new(),
            overflow: len as usize > UPLOAD_BUFFER_LEN,
            name_overflow: false,
        }
    }

    pub fn push_body(&mut self, byte: u8) {
        if self.body.push(byte).is_err() {
            self.overflow = true;
        }
    }

    pub fn push_name(&mut self, byte: u8) {
        if self.name.push(byte).is_err() {
            self.name_overflow = true;
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Write the buffered script through the store
    ///
    /// Returns the new directory index. On failure nothing is committed.
    pub fn store<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &self,
        io: &mut Io<'_, H, T, F>,
    ) -> Result<usize, StoreError> {
        if self.overflow {
            return Err(StoreError::RegionFull);
        }
        if self.name_overflow {
            return Err(StoreError::InvalidName);
        }
        let name = core::str::from_utf8(&self.name).map_err(|_| StoreError::InvalidName)?;

        let mut handle = io.scripts.begin_script(name)?;
        for &byte in self.body.iter() {
            if let Err(e) = io.scripts.append_byte(io.flash, &mut handle, byte) {
                io.scripts.abort_script(io.flash, handle);
                return Err(e);
            }
        }
        io.scripts.commit_script(io.flash, handle)
    }
}

/// Script mode phases
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptPhase {
    /// Scrolling through stored scripts
    Browsing,
    Receiving(Upload),
    Playing(Player),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptMode {
    pub phase: ScriptPhase,
    /// Directory index chosen with the Action button
    pub selection: usize,
}

impl Default for ScriptMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptMode {
    pub const fn new() -> Self {
        Self {
            phase: ScriptPhase::Browsing,
            selection: 0,
        }
    }

    pub fn handle<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        event: ModeEvent,
    ) {
        use ScriptPhase::*;

        match (&mut self.phase, event) {
            (_, ModeEvent::Host(HostCommand::UploadStart { slot, len })) => {
                self.phase = Receiving(Upload::new(slot, len));
            }
            (Receiving(upload), ModeEvent::Host(HostCommand::UploadByte(byte))) => {
                upload.push_body(byte);
            }
            (Receiving(upload), ModeEvent::Host(HostCommand::UploadNameByte(byte))) => {
                upload.push_name(byte);
            }
            (Receiving(_), ModeEvent::Host(HostCommand::UploadFinish)) => {
                if let Receiving(upload) = core::mem::replace(&mut self.phase, Browsing) {
                    if upload.store(io).is_ok() {
                        telemetry::report_ack(&mut *io.tx, io.scripts.count());
                    }
                }
            }
            (_, ModeEvent::Host(HostCommand::Play { slot })) => self.play(io, slot as usize),
            (_, ModeEvent::Host(HostCommand::Stop)) => self.phase = Browsing,
            (Browsing, ModeEvent::Action(Press::Short)) => self.scroll(io),
            (Browsing, ModeEvent::Action(Press::Long)) => self.play(io, self.selection),
            (Playing(player), event) => {
                if player.handle(io, event) == Progress::Done {
                    self.phase = Browsing;
                }
            }
            _ => {}
        }
    }

    fn scroll<H: SensorHead, T: ByteTx, F: SegmentFlash>(&mut self, io: &mut Io<'_, H, T, F>) {
        let count = io.scripts.count();
        if count == 0 {
            return;
        }
        self.selection = (self.selection + 1) % count;
        io.head.show_number(self.selection as u16);
    }

    fn play<H: SensorHead, T: ByteTx, F: SegmentFlash>(
        &mut self,
        io: &mut Io<'_, H, T, F>,
        index: usize,
    ) {
        if let Some(player) = Player::start(io, index) {
            self.selection = index;
            self.phase = ScriptPhase::Playing(player);
        }
    }
}
