//! Configuration type definitions
//!
//! These types describe the sensor head's behavior: servo geometry, ranger
//! limits, sweep extent, sampling cadence and button timing. Pin assignments
//! are fixed by the board and are not part of the configuration.

/// Largest servo angle any configuration may use (degrees)
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Servo configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// Pulse width at 0 degrees (µs)
    pub min_pulse_us: u16,
    /// Pulse width at `max_angle` (µs)
    pub max_pulse_us: u16,
    /// Mechanical travel in degrees
    pub max_angle: u8,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 500,
            max_pulse_us: 2400,
            max_angle: MAX_SERVO_ANGLE,
        }
    }
}

/// Ultrasonic ranger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangerConfig {
    /// Readings saturate at this distance (cm)
    pub max_range_cm: u16,
    /// Echo round trip time per centimeter (µs)
    pub us_per_cm: u16,
    /// Echo capture window before reporting a timeout (ms)
    pub timeout_ms: u16,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            max_range_cm: 400,
            us_per_cm: 58,
            timeout_ms: 30,
        }
    }
}

/// Sweep extent used by the detector modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepConfig {
    /// First angle (degrees)
    pub from: u8,
    /// Last angle (degrees)
    pub to: u8,
    /// Angle increment per step (degrees)
    pub step: u8,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            from: 0,
            to: MAX_SERVO_ANGLE,
            step: 3,
        }
    }
}

/// Sampling cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Sampling tick period (ms)
    pub tick_ms: u16,
    /// Ticks the servo is given to settle before sampling
    pub settle_ticks: u8,
    /// Script step delay until the first set-delay instruction (ms)
    pub default_delay_ms: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 60,
            settle_ticks: 1,
            default_delay_ms: 500,
        }
    }
}

impl TimingConfig {
    /// Convert a delay to whole ticks, at least one
    pub fn delay_ticks(&self, delay_ms: u32) -> u16 {
        let tick = self.tick_ms.max(1) as u32;
        (delay_ms.div_ceil(tick)).clamp(1, u16::MAX as u32) as u16
    }
}

/// Push-button timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Debounce window (ms)
    pub debounce_ms: u16,
    /// Hold time that turns a press into a long press (ms)
    pub long_press_ms: u16,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 30,
            long_press_ms: 700,
        }
    }
}

/// Host link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// UART baud rate
    pub baud: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { baud: 9600 }
    }
}

/// Telemeter defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemeterConfig {
    /// Angle used when tracking is started from the button (degrees)
    pub default_angle: u8,
}

impl Default for TelemeterConfig {
    fn default() -> Self {
        Self { default_angle: 90 }
    }
}

/// Complete sensor head configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    pub servo: ServoConfig,
    pub ranger: RangerConfig,
    pub sweep: SweepConfig,
    pub timing: TimingConfig,
    pub buttons: ButtonConfig,
    pub link: LinkConfig,
    pub telemeter: TelemeterConfig,
}

/// Reasons a configuration is rejected after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Servo pulse range empty or inverted
    ServoPulseRange,
    /// Servo travel is zero or beyond 180 degrees
    ServoTravel,
    /// Sweep bounds outside the servo travel or reversed
    SweepBounds,
    /// Sweep step of zero
    SweepStep,
    /// Zero tick period
    TickPeriod,
    /// Zero range or zero echo scale
    Ranger,
    /// Telemeter default angle outside the servo travel
    TelemeterAngle,
}

impl SensorConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servo.min_pulse_us >= self.servo.max_pulse_us {
            return Err(ConfigError::ServoPulseRange);
        }
        if self.servo.max_angle == 0 || self.servo.max_angle > MAX_SERVO_ANGLE {
            return Err(ConfigError::ServoTravel);
        }
        if self.sweep.from > self.sweep.to || self.sweep.to > self.servo.max_angle {
            return Err(ConfigError::SweepBounds);
        }
        if self.sweep.step == 0 {
            return Err(ConfigError::SweepStep);
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::TickPeriod);
        }
        if self.ranger.max_range_cm == 0 || self.ranger.us_per_cm == 0 {
            return Err(ConfigError::Ranger);
        }
        if self.telemeter.default_angle > self.servo.max_angle {
            return Err(ConfigError::TelemeterAngle);
        }
        Ok(())
    }
}
