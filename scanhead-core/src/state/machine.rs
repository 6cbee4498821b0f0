//! System state definition
//!
//! Mode changes follow a fixed cycle driven by the advance button.

/// Operating modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    /// Servo sweep reporting distances
    #[default]
    ObjectDetector,
    /// Fixed angle, repeated distance measurement
    Telemeter,
    /// Servo sweep reporting light levels, plus calibration
    LightDetector,
    /// Servo sweep reporting distance and light levels
    LightObjectDetector,
    /// Script upload, selection and playback
    Script,
}

impl SystemState {
    /// All states in cycle order
    pub const ALL: [SystemState; 5] = [
        SystemState::ObjectDetector,
        SystemState::Telemeter,
        SystemState::LightDetector,
        SystemState::LightObjectDetector,
        SystemState::Script,
    ];

    /// Next state in the advance cycle
    pub fn next(self) -> Self {
        use SystemState::*;

        match self {
            ObjectDetector => Telemeter,
            Telemeter => LightDetector,
            LightDetector => LightObjectDetector,
            LightObjectDetector => Script,
            Script => ObjectDetector,
        }
    }

    /// Host mode-select character for this state ('1'..'5')
    pub fn host_code(self) -> u8 {
        match self {
            SystemState::ObjectDetector => b'1',
            SystemState::Telemeter => b'2',
            SystemState::LightDetector => b'3',
            SystemState::LightObjectDetector => b'4',
            SystemState::Script => b'5',
        }
    }

    /// Parse a host mode-select character
    pub fn from_host_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.host_code() == code)
    }
}
