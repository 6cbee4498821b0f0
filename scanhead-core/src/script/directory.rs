//! Script directory
//!
//! A fixed-capacity table of `(name, size, location)` entries. Entries are
//! appended in location order and never removed, so scripts are packed in
//! the script region with no overlap.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum number of stored scripts
pub const MAX_SCRIPTS: usize = 10;

/// Maximum script name length in bytes
pub const MAX_NAME_LEN: usize = 7;

/// Largest serialized directory record
pub const MAX_DIRECTORY_BYTES: usize = 256;

/// Script name
pub type ScriptName = String<MAX_NAME_LEN>;

/// One stored script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirEntry {
    pub name: ScriptName,
    /// Length in bytes
    pub size: u16,
    /// Offset of the first byte in the script region
    pub location: u32,
}

impl DirEntry {
    /// One past the last byte, `None` if the span leaves the address space
    pub fn end(&self) -> Option<u32> {
        self.location.checked_add(self.size as u32)
    }
}

/// Why an entry was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectoryError {
    Full,
    DuplicateName,
    InvalidName,
    /// Entry would overlap an existing script
    Overlap,
    /// Entry ends past the addressable range
    OutOfRange,
}

/// The persisted table of scripts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptDirectory {
    entries: Vec<DirEntry, MAX_SCRIPTS>,
}

/// Check a name: 1..=7 printable ASCII characters, no spaces
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_graphic())
}

impl ScriptDirectory {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of stored scripts
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub fn get(&self, index: usize) -> Option<&DirEntry> {
        self.entries.get(index)
    }

    /// Index of the script with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.as_str() == name)
    }

    /// Byte span `(location, size)` of a script
    pub fn span(&self, index: usize) -> Option<(u32, u16)> {
        self.get(index).map(|e| (e.location, e.size))
    }

    /// First offset after the last stored script
    ///
    /// Saturates for an entry whose end is out of range, so such a
    /// directory never fits a region.
    pub fn next_free(&self) -> u32 {
        self.entries
            .last()
            .map_or(0, |e| e.end().unwrap_or(u32::MAX))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter()
    }

    /// Append an entry, enforcing the directory invariants
    pub fn try_push(&mut self, entry: DirEntry) -> Result<usize, DirectoryError> {
        if !validate_name(&entry.name) {
            return Err(DirectoryError::InvalidName);
        }
        if self.find(&entry.name).is_some() {
            return Err(DirectoryError::DuplicateName);
        }
        if entry.end().is_none() {
            return Err(DirectoryError::OutOfRange);
        }
        if entry.location < self.next_free() {
            return Err(DirectoryError::Overlap);
        }
        self.entries
            .push(entry)
            .map_err(|_| DirectoryError::Full)?;
        Ok(self.entries.len() - 1)
    }

    /// Remove the most recent entry
    pub fn pop(&mut self) -> Option<DirEntry> {
        self.entries.pop()
    }

    /// Check the invariants on data read back from flash
    pub fn is_consistent(&self) -> bool {
        let names_ok = self.entries.iter().enumerate().all(|(i, e)| {
            validate_name(&e.name) && self.entries[..i].iter().all(|o| o.name != e.name)
        });
        let in_range = self.entries.iter().all(|e| e.end().is_some());
        let packed = self
            .entries
            .windows(2)
            .all(|pair| pair[0].end().is_some_and(|end| end <= pair[1].location));
        names_ok && in_range && packed
    }

    /// Serialize into `buf`, returning the used bytes
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize a record read from flash
    ///
    /// Erased or corrupted data, and records that violate the invariants,
    /// decode to `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let directory: Self = postcard::from_bytes(bytes).ok()?;
        directory.is_consistent().then_some(directory)
    }
}
