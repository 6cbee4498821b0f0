//! Light sensor calibration table
//!
//! Ten reference light levels, one per 5 cm step from 5 cm to 50 cm, plus a
//! completion marker. The table lives in its own flash region and is
//! rewritten in place: a session erases the region once, then every point
//! is committed with an indexed single-byte write.

use scanhead_hal::{FlashError, SegmentFlash};

use super::layout::Region;

/// Bytes in the persisted table
pub const CALIBRATION_LEN: usize = 11;

/// Reference points per session
pub const CALIBRATION_POINTS: usize = 10;

/// Index of the completion marker
pub const MARKER_INDEX: usize = CALIBRATION_POINTS;

/// Marker value written when all points were taken
pub const CALIBRATION_COMPLETE: u8 = 0xA5;

/// Reference distance of the first point (cm)
pub const FIRST_POINT_CM: u8 = 5;

/// Distance between consecutive points (cm)
pub const POINT_SPACING_CM: u8 = 5;

/// In-memory copy of the calibration region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    region: Region,
    values: [u8; CALIBRATION_LEN],
}

impl CalibrationTable {
    /// Create an empty (erased) table for a region
    pub const fn new(region: Region) -> Self {
        Self {
            region,
            values: [0xFF; CALIBRATION_LEN],
        }
    }

    /// Read the table from flash
    pub fn load<F: SegmentFlash>(flash: &mut F, region: Region) -> Result<Self, FlashError> {
        let mut table = Self::new(region);
        flash.read(region.start, &mut table.values)?;
        Ok(table)
    }

    /// Re-read the table, keeping the current copy on failure
    pub fn reload<F: SegmentFlash>(&mut self, flash: &mut F) -> Result<(), FlashError> {
        let mut values = [0u8; CALIBRATION_LEN];
        flash.read(self.region.start, &mut values)?;
        self.values = values;
        Ok(())
    }

    /// Flash region holding the table
    pub fn region(&self) -> Region {
        self.region
    }

    /// Value at an index, if inside the table
    pub fn get(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }

    /// The reference points
    pub fn points(&self) -> &[u8] {
        &self.values[..CALIBRATION_POINTS]
    }

    /// Check if a full session has been recorded
    pub fn is_complete(&self) -> bool {
        self.values[MARKER_INDEX] == CALIBRATION_COMPLETE
    }

    /// Reference distance for a point index (cm)
    pub fn point_distance_cm(index: usize) -> Option<u8> {
        (index < CALIBRATION_POINTS).then(|| FIRST_POINT_CM + POINT_SPACING_CM * index as u8)
    }

    /// Erase the region before a new session
    pub fn begin_session<F: SegmentFlash>(&mut self, flash: &mut F) -> Result<(), FlashError> {
        flash.init_write(self.region.start)?;
        flash.disable_write();
        self.values = [0xFF; CALIBRATION_LEN];
        Ok(())
    }

    /// Store one averaged reference point
    pub fn commit_point<F: SegmentFlash>(
        &mut self,
        flash: &mut F,
        index: usize,
        value: u8,
    ) -> Result<(), FlashError> {
        if index >= CALIBRATION_POINTS {
            return Err(FlashError::OutOfBounds);
        }
        self.write_at(flash, index, value)
    }

    /// Write the completion marker
    pub fn finish_session<F: SegmentFlash>(&mut self, flash: &mut F) -> Result<(), FlashError> {
        self.write_at(flash, MARKER_INDEX, CALIBRATION_COMPLETE)
    }

    fn write_at<F: SegmentFlash>(
        &mut self,
        flash: &mut F,
        index: usize,
        value: u8,
    ) -> Result<(), FlashError> {
        let addr = self
            .region
            .address(index as u32)
            .ok_or(FlashError::OutOfBounds)?;
        flash.write_byte_at(value, addr)?;
        self.values[index] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFlash;

    fn region() -> Region {
        Region::new(4096, 4096)
    }

    #[test]
    fn test_commit_point_writes_indexed_byte() {
        let mut flash = MockFlash::new();
        let mut table = CalibrationTable::new(region());
        table.begin_session(&mut flash).unwrap();
        table.commit_point(&mut flash, 3, 101).unwrap();

        assert_eq!(table.get(3), Some(101));
        assert_eq!(flash.byte(4096 + 3), 101);
        assert!(!table.is_complete());
    }

    #[test]
    fn test_session_round_trip() {
        let mut flash = MockFlash::new();
        let mut table = CalibrationTable::new(region());
        table.begin_session(&mut flash).unwrap();
        for i in 0..CALIBRATION_POINTS {
            table.commit_point(&mut flash, i, 10 + i as u8).unwrap();
        }
        table.finish_session(&mut flash).unwrap();

        let loaded = CalibrationTable::load(&mut flash, region()).unwrap();
        assert!(loaded.is_complete());
        assert_eq!(loaded.points(), &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
    }

    #[test]
    fn test_marker_index_not_a_point() {
        let mut flash = MockFlash::new();
        let mut table = CalibrationTable::new(region());
        assert_eq!(
            table.commit_point(&mut flash, MARKER_INDEX, 1),
            Err(FlashError::OutOfBounds)
        );
        assert_eq!(table.get(CALIBRATION_LEN), None);
    }

    #[test]
    fn test_new_session_erases_previous_points() {
        let mut flash = MockFlash::new();
        let mut table = CalibrationTable::new(region());
        table.begin_session(&mut flash).unwrap();
        table.commit_point(&mut flash, 0, 42).unwrap();
        table.begin_session(&mut flash).unwrap();
        // Rewriting index 0 is only legal because the session erased it
        table.commit_point(&mut flash, 0, 43).unwrap();
        assert_eq!(flash.byte(4096), 43);
    }

    #[test]
    fn test_point_distances() {
        assert_eq!(CalibrationTable::point_distance_cm(0), Some(5));
        assert_eq!(CalibrationTable::point_distance_cm(9), Some(50));
        assert_eq!(CalibrationTable::point_distance_cm(10), None);
    }
}
