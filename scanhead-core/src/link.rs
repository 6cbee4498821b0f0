//! Host link decoder
//!
//! The host drives the head with single characters. Two commands carry a
//! payload and switch the decoder into a framing state until the payload
//! terminator arrives:
//!
//! - `V` digits `$`: telemeter angle
//! - upload (`A`, `C`, .. `S`): length byte, body, `$`, name length byte,
//!   name, `$`
//!
//! Payload bytes are never interpreted as commands.

use crate::state::SystemState;

/// Payload terminator
pub const FRAME_END: u8 = b'$';

/// Decoded host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Virtual advance to a specific mode
    SelectMode(SystemState),
    /// Stop the active mode's activity
    Stop,
    StartObjectScan,
    /// Start telemeter tracking at an angle
    Track(u8),
    StopTracking,
    StartLightScan,
    StartLightObjectScan,
    StartCalibration,
    SendCalibration,
    /// Simulated Action short press
    Action,
    /// Upload header received
    UploadStart { slot: u8, len: u8 },
    UploadByte(u8),
    /// Body done, name of `len` bytes follows
    UploadNameStart { len: u8 },
    UploadNameByte(u8),
    /// Name terminator received, upload complete
    UploadFinish,
    /// Play the script at a directory index
    Play { slot: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Idle,
    TrackAngle { value: u16, digits: u8 },
    UploadLen { slot: u8 },
    UploadBody { remaining: u8 },
    UploadBodyEnd,
    UploadNameLen,
    UploadName { remaining: u8 },
    UploadNameEnd,
}

/// Byte-at-a-time host command decoder
#[derive(Debug, Clone)]
pub struct LinkDecoder {
    framing: Framing,
}

impl Default for LinkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkDecoder {
    pub const fn new() -> Self {
        Self {
            framing: Framing::Idle,
        }
    }

    /// Check if a payload is being received
    pub fn in_frame(&self) -> bool {
        self.framing != Framing::Idle
    }

    /// Drop any partially received payload
    pub fn reset(&mut self) {
        self.framing = Framing::Idle;
    }

    /// Feed one received byte
    pub fn feed(&mut self, byte: u8) -> Option<HostCommand> {
        match self.framing {
            Framing::Idle => self.command(byte),

            Framing::TrackAngle { value, digits } => match byte {
                FRAME_END => {
                    self.framing = Framing::Idle;
                    Some(HostCommand::Track(value.min(u8::MAX as u16) as u8))
                }
                b'0'..=b'9' if digits < 3 => {
                    self.framing = Framing::TrackAngle {
                        value: value * 10 + (byte - b'0') as u16,
                        digits: digits + 1,
                    };
                    None
                }
                _ => {
                    // Garbled angle, wait for the next command
                    self.framing = Framing::Idle;
                    None
                }
            },

            Framing::UploadLen { slot } => {
                self.framing = if byte == 0 {
                    Framing::UploadBodyEnd
                } else {
                    Framing::UploadBody { remaining: byte }
                };
                Some(HostCommand::UploadStart { slot, len: byte })
            }

            Framing::UploadBody { remaining } => {
                self.framing = if remaining > 1 {
                    Framing::UploadBody {
                        remaining: remaining - 1,
                    }
                } else {
                    Framing::UploadBodyEnd
                };
                Some(HostCommand::UploadByte(byte))
            }

            Framing::UploadBodyEnd => {
                // The terminator is expected; anything else is skipped
                if byte == FRAME_END {
                    self.framing = Framing::UploadNameLen;
                }
                None
            }

            Framing::UploadNameLen => {
                self.framing = if byte == 0 {
                    Framing::UploadNameEnd
                } else {
                    Framing::UploadName { remaining: byte }
                };
                Some(HostCommand::UploadNameStart { len: byte })
            }

            Framing::UploadName { remaining } => {
                self.framing = if remaining > 1 {
                    Framing::UploadName {
                        remaining: remaining - 1,
                    }
                } else {
                    Framing::UploadNameEnd
                };
                Some(HostCommand::UploadNameByte(byte))
            }

            Framing::UploadNameEnd => {
                if byte == FRAME_END {
                    self.framing = Framing::Idle;
                    Some(HostCommand::UploadFinish)
                } else {
                    None
                }
            }
        }
    }

    fn command(&mut self, byte: u8) -> Option<HostCommand> {
        if let Some(state) = SystemState::from_host_code(byte) {
            return Some(HostCommand::SelectMode(state));
        }

        match byte {
            b'0' => Some(HostCommand::Stop),
            b'U' => Some(HostCommand::StartObjectScan),
            b'V' => {
                self.framing = Framing::TrackAngle {
                    value: 0,
                    digits: 0,
                };
                None
            }
            b'W' => Some(HostCommand::StopTracking),
            b'X' => Some(HostCommand::StartCalibration),
            b'Y' => Some(HostCommand::StartLightScan),
            b'Z' => Some(HostCommand::StartLightObjectScan),
            b'6' => Some(HostCommand::SendCalibration),
            b'a' => Some(HostCommand::Action),
            b'A'..=b'T' => {
                let offset = byte - b'A';
                let slot = offset / 2;
                if offset % 2 == 0 {
                    self.framing = Framing::UploadLen { slot };
                    None
                } else {
                    Some(HostCommand::Play { slot })
                }
            }
            _ => None,
        }
    }
}
