//! Servo angle to pulse width mapping

use crate::config::ServoConfig;

/// Pulse width for an angle, linear between the configured endpoints
///
/// Angles beyond the mechanical travel are clamped.
pub fn pulse_us(angle: u8, servo: &ServoConfig) -> u16 {
    let travel = servo.max_angle.max(1) as u32;
    let angle = (angle as u32).min(travel);
    let span = servo.max_pulse_us.saturating_sub(servo.min_pulse_us) as u32;
    servo.min_pulse_us + (span * angle / travel) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let servo = ServoConfig::default();
        assert_eq!(pulse_us(0, &servo), 500);
        assert_eq!(pulse_us(180, &servo), 2400);
        assert_eq!(pulse_us(90, &servo), 1450);
    }

    #[test]
    fn test_clamps_past_travel() {
        let servo = ServoConfig {
            min_pulse_us: 1000,
            max_pulse_us: 2000,
            max_angle: 160,
        };
        assert_eq!(pulse_us(200, &servo), 2000);
        assert_eq!(pulse_us(80, &servo), 1500);
    }
}
