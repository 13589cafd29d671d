use super::memory::MAX_PROGRAM_SIZE;

/// Faults reported by the VM. None of them terminate the process; the host
/// decides whether to abort, skip or log and continue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("program is {size} bytes, at most {max} bytes fit in memory")]
    Size { size: usize, max: usize },

    #[error("memory access out of bounds at address {0:#05X}")]
    Address(usize),

    #[error("stack overflow: call nested deeper than the call stack")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("unknown opcode {0:#06X}")]
    Decode(u16),

    #[error("key index {0} is not on the keypad")]
    InvalidKey(usize),

    #[error("a program is already loaded; initialize the VM before loading another")]
    AlreadyLoaded,

    #[error("no program loaded")]
    NoProgram,
}

impl Error {
    pub(crate) fn program_too_large(size: usize) -> Self {
        Error::Size {
            size,
            max: MAX_PROGRAM_SIZE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
