//! Error taxonomy for the execution engine.
//!
//! The teacher's `Memory`/`CPU` panic on the equivalent conditions; here they are
//! surfaced as ordinary `Result`s so a host (debug UI, test harness, fuzzer) can
//! recover instead of aborting the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("illegal opcode 0x{opcode:02X} encountered at PC=0x{pc:04X}")]
    CpuIllegalOpcode { opcode: u8, pc: u16 },

    #[error("address 0x{address:04X} is not covered by any registered bus device")]
    BusInvalidAddress { address: u16 },

    #[error("bus region 0x{start:04X}..=0x{end:04X} overlaps an already registered region")]
    BusMappingConflict { start: u16, end: u16 },

    #[error("could not parse ROM: {reason}")]
    RomParseError { reason: String },
}
