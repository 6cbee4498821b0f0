//! Persisted flash layout
//!
//! Offsets are relative to the storage area the flash implementation
//! exposes. Regions must be segment aligned so erasing one never touches
//! another.

/// A contiguous flash region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    /// First byte
    pub start: u32,
    /// Length in bytes
    pub len: u32,
}

impl Region {
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// One past the last byte
    pub const fn end(&self) -> u32 {
        self.start + self.len
    }

    /// Absolute address of a region-relative offset, if inside the region
    pub fn address(&self, offset: u32) -> Option<u32> {
        (offset < self.len).then(|| self.start + offset)
    }

    /// Check if `other` shares any byte with this region
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Storage segment size used by the default layout (bytes)
pub const DEFAULT_SEGMENT_SIZE: u32 = 4096;

/// Placement of the three persisted areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashLayout {
    /// Append-only script bytes, addressed by directory locations
    pub scripts: Region,
    /// Serialized script directory
    pub directory: Region,
    /// Calibration table, rewritten in place
    pub calibration: Region,
}

impl Default for FlashLayout {
    fn default() -> Self {
        // 64 KiB storage area: 48 KiB scripts, then one segment each
        Self {
            scripts: Region::new(0, 12 * DEFAULT_SEGMENT_SIZE),
            directory: Region::new(12 * DEFAULT_SEGMENT_SIZE, DEFAULT_SEGMENT_SIZE),
            calibration: Region::new(13 * DEFAULT_SEGMENT_SIZE, DEFAULT_SEGMENT_SIZE),
        }
    }
}

impl FlashLayout {
    /// Total bytes spanned by the layout
    pub fn span(&self) -> u32 {
        self.scripts
            .end()
            .max(self.directory.end())
            .max(self.calibration.end())
    }

    /// Check alignment and that no two regions overlap
    pub fn is_valid(&self, segment_size: u32) -> bool {
        let regions = [self.scripts, self.directory, self.calibration];
        let aligned = regions
            .iter()
            .all(|r| r.len > 0 && r.start % segment_size == 0 && r.len % segment_size == 0);
        aligned
            && !self.scripts.overlaps(&self.directory)
            && !self.scripts.overlaps(&self.calibration)
            && !self.directory.overlaps(&self.calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = FlashLayout::default();
        assert!(layout.is_valid(DEFAULT_SEGMENT_SIZE));
        assert_eq!(layout.span(), 14 * DEFAULT_SEGMENT_SIZE);
    }

    #[test]
    fn test_region_address_bounds() {
        let region = Region::new(100, 10);
        assert_eq!(region.address(0), Some(100));
        assert_eq!(region.address(9), Some(109));
        assert_eq!(region.address(10), None);
    }

    #[test]
    fn test_overlap_detection() {
        let layout = FlashLayout {
            scripts: Region::new(0, 8192),
            directory: Region::new(4096, 4096),
            calibration: Region::new(8192, 4096),
        };
        assert!(!layout.is_valid(4096));
    }
}
