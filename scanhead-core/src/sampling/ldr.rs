//! Light sensor interpretation
//!
//! The ADC delivers 12-bit counts. Reports use 10-bit levels, calibration
//! stores 8-bit values.

/// Largest reported light level
pub const LIGHT_LEVEL_MAX: u16 = 1023;

const ADC_MAX: u16 = 4095;

/// Reduce a raw 12-bit conversion to a 10-bit light level
pub fn light_level(raw: u16) -> u16 {
    raw.min(ADC_MAX) >> 2
}

/// Reduce a 10-bit light level to an 8-bit calibration sample
pub fn calibration_sample(level: u16) -> u8 {
    (level.min(LIGHT_LEVEL_MAX) >> 2) as u8
}

/// Average of the two sensors' calibration samples
pub fn calibration_average(sample1: u8, sample2: u8) -> u8 {
    ((sample1 as u16 + sample2 as u16) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_level_saturates() {
        assert_eq!(light_level(0), 0);
        assert_eq!(light_level(4095), 1023);
        assert_eq!(light_level(u16::MAX), 1023);
        assert_eq!(light_level(2048), 512);
    }

    #[test]
    fn test_calibration_average() {
        assert_eq!(calibration_average(100, 102), 101);
        assert_eq!(calibration_average(255, 255), 255);
        assert_eq!(calibration_average(0, 1), 0);
    }

    #[test]
    fn test_calibration_sample() {
        assert_eq!(calibration_sample(1023), 255);
        assert_eq!(calibration_sample(404), 101);
        assert_eq!(calibration_sample(2000), 255);
    }
}
