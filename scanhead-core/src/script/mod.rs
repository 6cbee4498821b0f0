//! Script persistence and execution
//!
//! - [`directory`]: the fixed-capacity table of stored scripts
//! - [`store`]: append-only flash storage behind the directory
//! - [`instruction`]: the 9-byte record format
//! - [`player`]: tick-driven playback through the live actuation paths

pub mod directory;
pub mod instruction;
pub mod player;
pub mod store;

pub use directory::{DirEntry, ScriptDirectory, ScriptName, MAX_NAME_LEN, MAX_SCRIPTS};
pub use instruction::{Instruction, InstructionError, Opcode, RECORD_LEN};
pub use player::Player;
pub use store::{ScriptHandle, ScriptStore, StoreError};
