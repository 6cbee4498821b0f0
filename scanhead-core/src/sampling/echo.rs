//! Ultrasonic echo interpretation

use crate::config::RangerConfig;

/// Convert an echo pulse width to a distance, saturating at the range limit
pub fn distance_cm(pulse_us: u32, ranger: &RangerConfig) -> u16 {
    let scale = ranger.us_per_cm.max(1) as u32;
    let cm = pulse_us / scale;
    cm.min(ranger.max_range_cm as u32) as u16
}

/// Distance reported when no echo arrives in the capture window
pub fn timeout_distance_cm(ranger: &RangerConfig) -> u16 {
    ranger.max_range_cm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_conversion() {
        let ranger = RangerConfig::default();
        assert_eq!(distance_cm(0, &ranger), 0);
        assert_eq!(distance_cm(580, &ranger), 10);
        assert_eq!(distance_cm(637, &ranger), 10);
        assert_eq!(distance_cm(5800, &ranger), 100);
    }

    #[test]
    fn test_distance_saturates() {
        let ranger = RangerConfig::default();
        assert_eq!(distance_cm(u32::MAX, &ranger), 400);
        assert_eq!(distance_cm(400 * 58 + 1000, &ranger), 400);
        assert_eq!(timeout_distance_cm(&ranger), 400);
    }
}
