use crate::error::{Error, Result};
use crate::memory::START_ROM;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;

/// Index of the register used as carry, borrow and collision flag.
pub const VF: usize = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// Chip-8 has 16 general purpose 8-bit registers, usually referred to as Vx, where x is a hexadecimal digit (0 through F).
    /// The VF register should not be used by any program, as it is used as a flag by some instructions.
    pub v: [u8; REGISTER_COUNT],

    pub i: u16,
    /// The program counter (PC) should be 16-bit, and is used to store the currently executing address.
    pub pc: u16,
    /// The stack pointer (SP) can be 8-bit, it is used to point to the topmost level of the stack.
    pub sp: usize,

    pub delay: u8,
    pub sound: u8,

    /// The stack is an array of 16 16-bit values, used to store the address that the interpreter shoud return to when finished with a subroutine. Chip-8 allows for up to 16 levels of nested subroutines.
    pub stack: [u16; STACK_SIZE],
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: START_ROM as u16,
            sp: 0,
            delay: 0,
            sound: 0,
            stack: [0; STACK_SIZE],
        }
    }

    pub fn reset(&mut self) {
        *self = Registers::new();
    }

    /// Saves the current pc on the stack and jumps to `address`.
    pub fn push(&mut self, address: u16) -> Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Error::StackOverflow {
                address: self.pc.wrapping_sub(2),
            });
        }

        self.stack[self.sp] = self.pc;
        self.sp += 1;
        self.pc = address;

        Ok(())
    }

    /// Returns to the address on top of the stack.
    pub fn pop(&mut self) -> Result<()> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow {
                address: self.pc.wrapping_sub(2),
            });
        }

        self.sp -= 1;
        self.pc = self.stack[self.sp];

        Ok(())
    }

    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[VF] = flag as u8;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
