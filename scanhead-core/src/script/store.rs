//! Script storage manager
//!
//! Scripts are appended to the script region through sequential flash
//! sessions. Every write lands on a byte that has not been written since its
//! segment was last erased:
//!
//! - a new script starts at the store's high-water cursor, which also moves
//!   past bytes left behind by aborted recordings
//! - segments past the erased high-water mark are erased on first use
//! - at boot, a non-blank tail after the last committed script pushes the
//!   cursor to the next segment boundary
//!
//! A script only becomes visible once its directory entry is committed.

use scanhead_hal::{FlashError, SegmentFlash};

use super::directory::{
    validate_name, DirEntry, DirectoryError, ScriptDirectory, ScriptName, MAX_DIRECTORY_BYTES,
};
use crate::config::{FlashLayout, Region};

/// Storage errors, reported synchronously to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// All directory slots used
    DirectoryFull,
    /// A committed script already has this name
    DuplicateName,
    /// Name empty, too long or not printable ASCII
    InvalidName,
    /// Script region exhausted
    RegionFull,
    /// Another recording is still open
    Busy,
    /// No script at this directory index
    UnknownScript,
    /// Directory record could not be encoded
    Encode,
    Flash(FlashError),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<DirectoryError> for StoreError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Full => StoreError::DirectoryFull,
            DirectoryError::DuplicateName => StoreError::DuplicateName,
            DirectoryError::InvalidName => StoreError::InvalidName,
            DirectoryError::Overlap | DirectoryError::OutOfRange => StoreError::RegionFull,
        }
    }
}

/// An open recording
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptHandle {
    name: ScriptName,
    start: u32,
    next: u32,
    session_open: bool,
}

impl ScriptHandle {
    /// Bytes written so far
    pub fn len(&self) -> u32 {
        self.next - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.next == self.start
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Scripts directory plus append cursor over the script region
#[derive(Debug)]
pub struct ScriptStore {
    scripts: Region,
    directory_region: Region,
    directory: ScriptDirectory,
    /// Next unwritten offset in the script region
    cursor: u32,
    /// Offsets from here on need an erase before writing
    erased_to: u32,
    recording: bool,
}

const BLANK: u8 = 0xFF;

impl ScriptStore {
    /// Empty store over the given layout, nothing read from flash
    pub fn new(layout: &FlashLayout) -> Self {
        Self {
            scripts: layout.scripts,
            directory_region: layout.directory,
            directory: ScriptDirectory::new(),
            cursor: 0,
            erased_to: 0,
            recording: false,
        }
    }

    /// Load the directory and recover the append cursor
    ///
    /// A missing or invalid directory yields an empty store.
    pub fn load<F: SegmentFlash>(flash: &mut F, layout: &FlashLayout) -> Result<Self, FlashError> {
        let mut store = Self::new(layout);

        let mut buf = [0u8; MAX_DIRECTORY_BYTES];
        let len = buf.len().min(store.directory_region.len as usize);
        flash.read(store.directory_region.start, &mut buf[..len])?;

        if let Some(directory) = ScriptDirectory::decode(&buf[..len]) {
            if directory.next_free() <= store.scripts.len {
                store.directory = directory;
            }
        }

        store.recover_cursor(flash)?;
        Ok(store)
    }

    fn recover_cursor<F: SegmentFlash>(&mut self, flash: &mut F) -> Result<(), FlashError> {
        let segment = flash.segment_size();
        let cursor = self.directory.next_free();

        if cursor % segment == 0 {
            self.cursor = cursor;
            self.erased_to = cursor;
            return Ok(());
        }

        let segment_end = (cursor - cursor % segment + segment).min(self.scripts.len);
        let blank = self.is_blank(flash, cursor, segment_end)?;
        self.cursor = if blank { cursor } else { segment_end };
        self.erased_to = segment_end;
        Ok(())
    }

    fn is_blank<F: SegmentFlash>(&self, flash: &mut F, from: u32, to: u32) -> Result<bool, FlashError> {
        let mut chunk = [0u8; 64];
        let mut offset = from;
        while offset < to {
            let n = ((to - offset) as usize).min(chunk.len());
            flash.read(self.scripts.start + offset, &mut chunk[..n])?;
            if chunk[..n].iter().any(|&b| b != BLANK) {
                return Ok(false);
            }
            offset += n as u32;
        }
        Ok(true)
    }

    pub fn directory(&self) -> &ScriptDirectory {
        &self.directory
    }

    /// Number of committed scripts
    pub fn count(&self) -> usize {
        self.directory.count()
    }

    /// Offset the next recording will start at
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Start recording a new script
    pub fn begin_script(&mut self, name: &str) -> Result<ScriptHandle, StoreError> {
        if self.recording {
            return Err(StoreError::Busy);
        }
        if !validate_name(name) {
            return Err(StoreError::InvalidName);
        }
        if self.directory.is_full() {
            return Err(StoreError::DirectoryFull);
        }
        if self.directory.find(name).is_some() {
            return Err(StoreError::DuplicateName);
        }
        if self.cursor >= self.scripts.len {
            return Err(StoreError::RegionFull);
        }

        let name = ScriptName::try_from(name).map_err(|_| StoreError::InvalidName)?;
        self.recording = true;
        Ok(ScriptHandle {
            name,
            start: self.cursor,
            next: self.cursor,
            session_open: false,
        })
    }

    /// Append one byte to an open recording
    pub fn append_byte<F: SegmentFlash>(
        &mut self,
        flash: &mut F,
        handle: &mut ScriptHandle,
        byte: u8,
    ) -> Result<(), StoreError> {
        if handle.next >= self.scripts.len || handle.len() >= u16::MAX as u32 {
            return Err(StoreError::RegionFull);
        }

        let addr = self.scripts.start + handle.next;
        if handle.next >= self.erased_to {
            flash.init_write(addr)?;
            let segment = flash.segment_size();
            self.erased_to = (handle.next - handle.next % segment + segment).min(self.scripts.len);
            handle.session_open = true;
        } else if !handle.session_open {
            flash.cont_write(addr)?;
            handle.session_open = true;
        }

        flash.write_byte(byte)?;
        handle.next += 1;
        self.cursor = self.cursor.max(handle.next);
        Ok(())
    }

    /// Close a recording and publish it, returning its directory index
    ///
    /// If the directory cannot be persisted the entry is rolled back and the
    /// written bytes are leaked.
    pub fn commit_script<F: SegmentFlash>(
        &mut self,
        flash: &mut F,
        handle: ScriptHandle,
    ) -> Result<usize, StoreError> {
        flash.disable_write();
        self.recording = false;

        let entry = DirEntry {
            size: handle.len() as u16,
            location: handle.start,
            name: handle.name,
        };
        let index = self.directory.try_push(entry)?;

        if let Err(e) = self.persist(flash) {
            self.directory.pop();
            return Err(e);
        }
        Ok(index)
    }

    /// Drop a recording without publishing it
    pub fn abort_script<F: SegmentFlash>(&mut self, flash: &mut F, handle: ScriptHandle) {
        if handle.session_open {
            flash.disable_write();
        }
        self.recording = false;
    }

    fn persist<F: SegmentFlash>(&mut self, flash: &mut F) -> Result<(), StoreError> {
        let mut buf = [0u8; MAX_DIRECTORY_BYTES];
        let bytes = self
            .directory
            .encode(&mut buf)
            .map_err(|_| StoreError::Encode)?;

        let result = flash
            .init_write(self.directory_region.start)
            .and_then(|()| bytes.iter().try_for_each(|&b| flash.write_byte(b)));
        flash.disable_write();
        result.map_err(StoreError::from)
    }

    /// Read script bytes starting at `offset` into `buf`
    ///
    /// Returns the number of bytes read, zero past the end of the script.
    pub fn read_script<F: SegmentFlash>(
        &self,
        flash: &mut F,
        index: usize,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<usize, StoreError> {
        let (location, size) = self.directory.span(index).ok_or(StoreError::UnknownScript)?;
        let size = size as u32;
        if offset >= size {
            return Ok(0);
        }

        let n = buf.len().min((size - offset) as usize);
        flash.read(self.scripts.start + location + offset, &mut buf[..n])?;
        Ok(n)
    }
}
