use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The operand that left its valid domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Register index of 8 or more.
    Register(u8),
    /// Memory address outside 0..=255.
    Address(u16),
    /// Stack pointer that a push or pop would move outside 0..=255.
    StackPointer(u8),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Register(index) => write!(f, "register R{}", index),
            Target::Address(addr) => write!(f, "memory address {:#04x}", addr),
            Target::StackPointer(sp) => write!(f, "stack pointer {:#04x}", sp),
        }
    }
}

/// Fatal machine faults. Every runtime variant carries the address of the
/// instruction that failed.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("invalid opcode {opcode:#010b} at address {address:#04x}")]
    InvalidOpcode { opcode: u8, address: u16 },

    #[error("{target} out of range at address {address:#04x}")]
    OutOfRange { target: Target, address: u16 },

    #[error("division by zero (divisor R{register}) at address {address:#04x}")]
    DivideByZero { register: u8, address: u16 },

    #[error("step limit of {limit} reached at address {address:#04x}")]
    Timeout { limit: u64, address: u16 },

    #[error("machine already stopped by a fault at address {address:#04x}")]
    Faulted { address: u16 },

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl CpuError {
    pub fn address(&self) -> Option<u16> {
        match self {
            CpuError::InvalidOpcode { address, .. }
            | CpuError::OutOfRange { address, .. }
            | CpuError::DivideByZero { address, .. }
            | CpuError::Timeout { address, .. }
            | CpuError::Faulted { address } => Some(*address),
            CpuError::Load(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: '{text}' is not an 8-bit binary word")]
    Malformed { line: usize, text: String },

    #[error("program of {words} words does not fit in memory at origin {origin:#04x}")]
    TooLarge { words: usize, origin: u16 },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_name_kind_and_address() {
        let err = CpuError::InvalidOpcode {
            opcode: 0xff,
            address: 0,
        };
        assert_eq!(err.to_string(), "invalid opcode 0b11111111 at address 0x00");
        assert_eq!(err.address(), Some(0));

        let err = CpuError::OutOfRange {
            target: Target::Register(9),
            address: 0x0a,
        };
        assert_eq!(err.to_string(), "register R9 out of range at address 0x0a");
    }

    #[test]
    fn test_load_error_has_no_address() {
        let err: CpuError = LoadError::Malformed {
            line: 3,
            text: "1012".to_string(),
        }
        .into();
        assert_eq!(err.address(), None);
        assert_eq!(
            err.to_string(),
            "line 3: '1012' is not an 8-bit binary word"
        );
    }
}
