pub mod devices;
pub mod display;
mod error;
pub mod interpreter;
pub mod keyboard;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod registers;

pub use error::{Error, Result};
pub use machine::Machine;
