use std::fmt;

use crate::error::Result;
use crate::interpreter::Interpreter;

/// A 16-bit instruction word.
///
/// Chip-8 opcodes are cased on their most significant nibble, some families
/// (`0`, `8`, `E`, `F`) are further cased on the lowest nibble or byte. The
/// remaining nibbles carry the operands:
/// - `_x__` the register Vx, or the range V0..=Vx
/// - `__y_` the register Vy
/// - `___n` a 4-bit immediate
/// - `__nn` an 8-bit immediate
/// - `_nnn` a 12-bit address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn family(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// Finds the table entry this word is an instance of.
    pub fn decode(self) -> Option<&'static Instruction> {
        INSTRUCTIONS.iter().find(|instruction| instruction.matches(self))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Some(instruction) => write!(f, "{:04X} {}", self.0, instruction.disassemble(*self)),
            None => write!(f, "{:04X} ???", self.0),
        }
    }
}

pub(crate) type Handler = fn(&mut Interpreter, Opcode) -> Result<()>;

/// One row of the opcode table, a word is an instance of it if
/// `word & mask == pattern`.
pub struct Instruction {
    mask: u16,
    pattern: u16,
    mnemonic: &'static str,
    pub(crate) handler: Handler,
}

impl Instruction {
    pub fn matches(&self, opcode: Opcode) -> bool {
        opcode.0 & self.mask == self.pattern
    }

    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    /// Fills the operands of `opcode` into the mnemonic template.
    pub fn disassemble(&self, opcode: Opcode) -> String {
        self.mnemonic
            .replace("{nnn}", &format!("{:#05X}", opcode.nnn()))
            .replace("{nn}", &format!("{:#04X}", opcode.nn()))
            .replace("{n}", &format!("{:X}", opcode.n()))
            .replace("{x}", &format!("{:X}", opcode.x()))
            .replace("{y}", &format!("{:X}", opcode.y()))
    }
}

const fn op(mask: u16, pattern: u16, mnemonic: &'static str, handler: Handler) -> Instruction {
    Instruction {
        mask,
        pattern,
        mnemonic,
        handler,
    }
}

const FAMILY: u16 = 0xF000;
const FAMILY_AND_LOW_NIBBLE: u16 = 0xF00F;
const FAMILY_AND_LOW_BYTE: u16 = 0xF0FF;
const WHOLE: u16 = 0xFFFF;

/// The canonical instruction set. `00E0` and `00EE` come before `0nnn` so
/// they win over SYS.
pub static INSTRUCTIONS: [Instruction; 35] = [
    op(WHOLE, 0x00E0, "CLS", Interpreter::handle_clear),
    op(WHOLE, 0x00EE, "RET", Interpreter::handle_ret),
    op(FAMILY, 0x0000, "SYS {nnn}", Interpreter::handle_sys),
    op(FAMILY, 0x1000, "JP {nnn}", Interpreter::handle_jump),
    op(FAMILY, 0x2000, "CALL {nnn}", Interpreter::handle_call),
    op(FAMILY, 0x3000, "SE V{x}, {nn}", Interpreter::handle_skip_if_equal_immediate),
    op(FAMILY, 0x4000, "SNE V{x}, {nn}", Interpreter::handle_skip_if_not_equal_immediate),
    op(FAMILY_AND_LOW_NIBBLE, 0x5000, "SE V{x}, V{y}", Interpreter::handle_skip_if_equal_register),
    op(FAMILY, 0x6000, "LD V{x}, {nn}", Interpreter::handle_load_register_immediate),
    op(FAMILY, 0x7000, "ADD V{x}, {nn}", Interpreter::handle_add_register_immediate),
    op(FAMILY_AND_LOW_NIBBLE, 0x8000, "LD V{x}, V{y}", Interpreter::handle_load_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8001, "OR V{x}, V{y}", Interpreter::handle_or_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8002, "AND V{x}, V{y}", Interpreter::handle_and_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8003, "XOR V{x}, V{y}", Interpreter::handle_xor_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8004, "ADD V{x}, V{y}", Interpreter::handle_add_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8005, "SUB V{x}, V{y}", Interpreter::handle_sub_register_register),
    op(FAMILY_AND_LOW_NIBBLE, 0x8006, "SHR V{x}", Interpreter::handle_shift_right_register_one),
    op(FAMILY_AND_LOW_NIBBLE, 0x8007, "SUBN V{x}, V{y}", Interpreter::handle_sub_register_register_negated),
    op(FAMILY_AND_LOW_NIBBLE, 0x800E, "SHL V{x}", Interpreter::handle_shift_left_register_one),
    op(FAMILY_AND_LOW_NIBBLE, 0x9000, "SNE V{x}, V{y}", Interpreter::handle_skip_if_not_equal_register),
    op(FAMILY, 0xA000, "LD I, {nnn}", Interpreter::handle_load_immediate),
    op(FAMILY, 0xB000, "JP V0, {nnn}", Interpreter::handle_jump_offset),
    op(FAMILY, 0xC000, "RND V{x}, {nn}", Interpreter::handle_random),
    op(FAMILY, 0xD000, "DRW V{x}, V{y}, {n}", Interpreter::handle_draw_sprite),
    op(FAMILY_AND_LOW_BYTE, 0xE09E, "SKP V{x}", Interpreter::handle_skip_if_pressed),
    op(FAMILY_AND_LOW_BYTE, 0xE0A1, "SKNP V{x}", Interpreter::handle_skip_if_not_pressed),
    op(FAMILY_AND_LOW_BYTE, 0xF007, "LD V{x}, DT", Interpreter::handle_load_delay),
    op(FAMILY_AND_LOW_BYTE, 0xF00A, "LD V{x}, K", Interpreter::handle_wait_for_key),
    op(FAMILY_AND_LOW_BYTE, 0xF015, "LD DT, V{x}", Interpreter::handle_set_delay),
    op(FAMILY_AND_LOW_BYTE, 0xF018, "LD ST, V{x}", Interpreter::handle_set_sound),
    op(FAMILY_AND_LOW_BYTE, 0xF01E, "ADD I, V{x}", Interpreter::handle_add_index),
    op(FAMILY_AND_LOW_BYTE, 0xF029, "LD F, V{x}", Interpreter::handle_load_glyph),
    op(FAMILY_AND_LOW_BYTE, 0xF033, "LD B, V{x}", Interpreter::handle_store_bcd),
    op(FAMILY_AND_LOW_BYTE, 0xF055, "LD [I], V{x}", Interpreter::handle_store_registers),
    op(FAMILY_AND_LOW_BYTE, 0xF065, "LD V{x}, [I]", Interpreter::handle_load_registers),
];
