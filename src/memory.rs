use crate::error::{Error, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const START_ROM: usize = 0x200;
pub const ROM_SIZE: usize = MEMORY_SIZE - START_ROM;

/// Every address is folded into the 12 bit address space.
const ADDRESS_MASK: usize = MEMORY_SIZE - 1;

/// Height in bytes of one built in glyph.
pub const GLYPH_SIZE: u16 = 5;

const FONT_DATA: &[u8] = &[
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Debug)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    pub fn new() -> Self {
        let mut memory = Memory([0; MEMORY_SIZE]);
        memory.reset();
        memory
    }

    /// Zeroes the whole memory and writes the hexadecimal font to the
    /// lowest addresses.
    pub fn reset(&mut self) {
        self.0.fill(0);
        self.0[0..FONT_DATA.len()].copy_from_slice(FONT_DATA);
    }

    /// Copies the rom to the load address. A rom larger than the program
    /// area is rejected before a single byte is written.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        let rom_size = bytes.len();
        if rom_size > ROM_SIZE {
            return Err(Error::RomTooLarge {
                len: rom_size,
                capacity: ROM_SIZE,
            });
        }

        self.0[START_ROM..START_ROM + rom_size].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read(&self, address: u16) -> u8 {
        self.0[address as usize & ADDRESS_MASK]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.0[address as usize & ADDRESS_MASK] = value;
    }

    /// Instructions are stored big-endian.
    pub fn read_word(&self, address: u16) -> u16 {
        u16::from_be_bytes([self.read(address), self.read(address.wrapping_add(1))])
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
