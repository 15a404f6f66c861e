use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    #[error("Rom of {len} bytes does not fit into the {capacity} bytes of program memory.")]
    RomTooLarge { len: usize, capacity: usize },
    #[error("An unsupported opcode {opcode:#06X} was fetched at {address:#05X}.")]
    UnknownOpcode { opcode: u16, address: u16 },
    #[error("There is no renderer attached to the machine.")]
    MissingRenderer,
    #[error("There is no rom loaded into the machine.")]
    NoRomLoaded,
    #[error("Stack is full, call at {address:#05X} can not be made.")]
    StackOverflow { address: u16 },
    #[error("Stack is empty, return at {address:#05X} has no caller.")]
    StackUnderflow { address: u16 },
}

impl Error {
    /// Decode errors only cost the cycle they happened in, everything else
    /// stops the machine.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnknownOpcode { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
