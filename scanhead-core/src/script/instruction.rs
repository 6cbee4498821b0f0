//! Script instruction records
//!
//! A record is 9 ASCII digits: `opcode[3] arg1[3] arg2[3]`.

/// Bytes per record
pub const RECORD_LEN: usize = 9;

const FIELD_LEN: usize = 3;

/// Instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Readout counts 0..=arg1
    CountUp = 1,
    /// Readout counts arg1..=0
    CountDown = 2,
    /// Character arg1 rotates right across the readout
    RotateRight = 3,
    /// Step delay in 10 ms units
    SetDelay = 4,
    ClearReadout = 5,
    /// Point at arg1 and measure once
    ServoTo = 6,
    /// Distance sweep arg1..=arg2
    ServoScan = 7,
    /// End of playback
    Sleep = 8,
}

impl Opcode {
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Opcode::CountUp,
            2 => Opcode::CountDown,
            3 => Opcode::RotateRight,
            4 => Opcode::SetDelay,
            5 => Opcode::ClearReadout,
            6 => Opcode::ServoTo,
            7 => Opcode::ServoScan,
            8 => Opcode::Sleep,
            _ => return None,
        })
    }

    /// Numeric code echoed to the host
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Record parse failures; playback treats them as no-ops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstructionError {
    /// Non-digit character in a field
    Malformed,
    UnknownOpcode,
    /// Fewer than 9 bytes left
    Truncated,
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instruction {
    pub opcode: Opcode,
    pub arg1: u16,
    pub arg2: u16,
}

impl Instruction {
    /// Decode one record from the front of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, InstructionError> {
        let record = bytes
            .get(..RECORD_LEN)
            .ok_or(InstructionError::Truncated)?;

        let opcode = parse_field(&record[..FIELD_LEN])?;
        let arg1 = parse_field(&record[FIELD_LEN..2 * FIELD_LEN])?;
        let arg2 = parse_field(&record[2 * FIELD_LEN..])?;

        let opcode = Opcode::from_u16(opcode).ok_or(InstructionError::UnknownOpcode)?;
        Ok(Self { opcode, arg1, arg2 })
    }

    /// First argument clamped into a byte
    pub fn arg1_u8(&self) -> u8 {
        self.arg1.min(u8::MAX as u16) as u8
    }

    /// Second argument clamped into a byte
    pub fn arg2_u8(&self) -> u8 {
        self.arg2.min(u8::MAX as u16) as u8
    }
}

fn parse_field(field: &[u8]) -> Result<u16, InstructionError> {
    field.iter().try_fold(0u16, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + (b - b'0') as u16)
        } else {
            Err(InstructionError::Malformed)
        }
    })
}
