use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    display::Display,
    error::{Error, Result},
    keyboard::Keyboard,
    memory::{Memory, GLYPH_SIZE},
    opcode::Opcode,
    registers::Registers,
};

/// Whether the instruction stream may advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    /// `Fx0A` was executed, the next key press goes into the register.
    AwaitingKey(usize),
}

pub struct Interpreter {
    registers: Registers,
    memory: Memory,
    display: Display,
    keyboard: Keyboard,
    rng: ChaCha8Rng,
    state: ExecutionState,
    frame_dirty: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// The random opcode draws from a stream determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Interpreter {
            registers: Registers::new(),
            memory: Memory::new(),
            display: Display::new(),
            keyboard: Keyboard::new(),
            rng,
            state: ExecutionState::Running,
            frame_dirty: false,
        }
    }

    /// Brings memory, registers, timers and display back to power-on state.
    /// Key state belongs to the host and is left alone.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers.reset();
        self.display.clear();
        self.state = ExecutionState::Running;
        self.frame_dirty = false;
    }

    /// Resets the interpreter and copies the rom to the load address. If the
    /// rom is rejected the interpreter stays reset.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        self.reset();
        self.memory.load_rom(bytes)
    }

    /// Fetches, decodes and executes a single instruction.
    ///
    /// The pc is advanced before the instruction runs, so jumps overwrite the
    /// advanced value and a failed decode simply moves on to the next word.
    pub fn cycle(&mut self) -> Result<()> {
        if self.is_awaiting_key() {
            return Ok(());
        }

        let address = self.registers.pc;
        let opcode = Opcode(self.memory.read_word(address));
        self.registers.pc = address.wrapping_add(2);

        let instruction = opcode.decode().ok_or(Error::UnknownOpcode {
            opcode: opcode.0,
            address,
        })?;

        log::trace!("{:#05X}: {}", address, opcode);

        (instruction.handler)(self, opcode)
    }

    /// Hands a key press to a pending `Fx0A`. Returns `true` if the
    /// interpreter was waiting and runs again.
    pub fn resolve_waiting_key(&mut self, key: u8) -> bool {
        match self.state {
            ExecutionState::AwaitingKey(x) if (key as usize) < crate::keyboard::KEY_COUNT => {
                log::debug!("Key {:X} resolves the wait on V{:X}", key, x);
                self.registers.v[x] = key;
                self.state = ExecutionState::Running;
                true
            }
            _ => false,
        }
    }

    /// Counts both timers down by one. Returns `true` when the sound timer
    /// just ran out.
    pub fn decrement_timers(&mut self) -> bool {
        self.registers.delay = self.registers.delay.saturating_sub(1);

        match self.registers.sound {
            0 => false,
            sound => {
                self.registers.sound = sound - 1;
                sound == 1
            }
        }
    }

    /// Returns whether the display changed since the last call.
    pub fn take_frame_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.frame_dirty, false)
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, ExecutionState::AwaitingKey(_))
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// 00E0 - CLS
    /// Clear the display.
    pub(crate) fn handle_clear(&mut self, _opcode: Opcode) -> Result<()> {
        self.display.clear();
        self.frame_dirty = true;
        Ok(())
    }

    /// 00EE - RET
    /// Return from a subroutine.
    ///
    /// The interpreter subtracts 1 from the stack pointer, then sets the program counter to the address at the top of the stack.
    pub(crate) fn handle_ret(&mut self, _opcode: Opcode) -> Result<()> {
        self.registers.pop()
    }

    /// 0nnn - SYS addr
    /// Jump to a machine code routine at nnn.
    ///
    /// Only the original hardware could run native routines, it is ignored.
    pub(crate) fn handle_sys(&mut self, opcode: Opcode) -> Result<()> {
        log::debug!("Ignoring machine code routine at {:#05X}", opcode.nnn());
        Ok(())
    }

    /// 1nnn - JP addr
    /// Jump to location nnn.
    ///
    /// The interpreter sets the program counter to nnn.
    pub(crate) fn handle_jump(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.pc = opcode.nnn();
        Ok(())
    }

    /// 2nnn - CALL addr
    /// Call subroutine at nnn.
    ///
    /// The interpreter puts the current PC on the top of the stack, then increments the stack pointer. The PC is then set to nnn.
    pub(crate) fn handle_call(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.push(opcode.nnn())
    }

    /// 3xkk - SE Vx, byte
    /// Skip next instruction if Vx = kk.
    pub(crate) fn handle_skip_if_equal_immediate(&mut self, opcode: Opcode) -> Result<()> {
        if self.registers.v[opcode.x()] == opcode.nn() {
            self.registers.skip();
        }
        Ok(())
    }

    /// 4xkk - SNE Vx, byte
    /// Skip next instruction if Vx != kk.
    pub(crate) fn handle_skip_if_not_equal_immediate(&mut self, opcode: Opcode) -> Result<()> {
        if self.registers.v[opcode.x()] != opcode.nn() {
            self.registers.skip();
        }
        Ok(())
    }

    /// 5xy0 - SE Vx, Vy
    /// Skip next instruction if Vx = Vy.
    pub(crate) fn handle_skip_if_equal_register(&mut self, opcode: Opcode) -> Result<()> {
        if self.registers.v[opcode.x()] == self.registers.v[opcode.y()] {
            self.registers.skip();
        }
        Ok(())
    }

    /// 6xkk - LD Vx, byte
    /// Set Vx = kk.
    pub(crate) fn handle_load_register_immediate(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] = opcode.nn();
        Ok(())
    }

    /// 7xkk - ADD Vx, byte
    /// Set Vx = Vx + kk.
    ///
    /// The carry flag is left alone.
    pub(crate) fn handle_add_register_immediate(&mut self, opcode: Opcode) -> Result<()> {
        let x = opcode.x();
        self.registers.v[x] = self.registers.v[x].wrapping_add(opcode.nn());
        Ok(())
    }

    /// 8xy0 - LD Vx, Vy
    /// Set Vx = Vy.
    pub(crate) fn handle_load_register_register(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] = self.registers.v[opcode.y()];
        Ok(())
    }

    /// 8xy1 - OR Vx, Vy
    /// Set Vx = Vx OR Vy.
    pub(crate) fn handle_or_register_register(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] |= self.registers.v[opcode.y()];
        Ok(())
    }

    /// 8xy2 - AND Vx, Vy
    /// Set Vx = Vx AND Vy.
    pub(crate) fn handle_and_register_register(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] &= self.registers.v[opcode.y()];
        Ok(())
    }

    /// 8xy3 - XOR Vx, Vy
    /// Set Vx = Vx XOR Vy.
    pub(crate) fn handle_xor_register_register(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] ^= self.registers.v[opcode.y()];
        Ok(())
    }

    /// 8xy4 - ADD Vx, Vy
    /// Set Vx = Vx + Vy, set VF = carry.
    ///
    /// The values of Vx and Vy are added together. If the result is greater than 8 bits
    /// (i.e., > 255,) VF is set to 1, otherwise 0. Only the lowest 8 bits of the result are kept, and stored in Vx.
    pub(crate) fn handle_add_register_register(&mut self, opcode: Opcode) -> Result<()> {
        let a = self.registers.v[opcode.x()];
        let b = self.registers.v[opcode.y()];

        let (result, overflow) = a.overflowing_add(b);
        self.registers.v[opcode.x()] = result;
        self.registers.set_flag(overflow);
        Ok(())
    }

    /// 8xy5 - SUB Vx, Vy
    /// Set Vx = Vx - Vy, set VF = NOT borrow.
    ///
    /// If Vx > Vy, then VF is set to 1, otherwise 0. Then Vy is subtracted from Vx, and the results stored in Vx.
    pub(crate) fn handle_sub_register_register(&mut self, opcode: Opcode) -> Result<()> {
        let a = self.registers.v[opcode.x()];
        let b = self.registers.v[opcode.y()];

        self.registers.v[opcode.x()] = a.wrapping_sub(b);
        self.registers.set_flag(a > b);
        Ok(())
    }

    /// 8xy6 - SHR Vx {, Vy}
    /// Set Vx = Vx SHR 1.
    ///
    /// If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0. Then Vx is divided by 2.
    pub(crate) fn handle_shift_right_register_one(&mut self, opcode: Opcode) -> Result<()> {
        let a = self.registers.v[opcode.x()];

        self.registers.v[opcode.x()] = a >> 1;
        self.registers.set_flag(a & 1 == 1);
        Ok(())
    }

    /// 8xy7 - SUBN Vx, Vy
    /// Set Vx = Vy - Vx, set VF = NOT borrow.
    ///
    /// If Vy > Vx, then VF is set to 1, otherwise 0. Then Vx is subtracted from Vy, and the results stored in Vx.
    pub(crate) fn handle_sub_register_register_negated(&mut self, opcode: Opcode) -> Result<()> {
        let a = self.registers.v[opcode.x()];
        let b = self.registers.v[opcode.y()];

        self.registers.v[opcode.x()] = b.wrapping_sub(a);
        self.registers.set_flag(b > a);
        Ok(())
    }

    /// 8xyE - SHL Vx {, Vy}
    /// Set Vx = Vx SHL 1.
    ///
    /// If the most-significant bit of Vx is 1, then VF is set to 1, otherwise to 0. Then Vx is multiplied by 2.
    pub(crate) fn handle_shift_left_register_one(&mut self, opcode: Opcode) -> Result<()> {
        let a = self.registers.v[opcode.x()];

        self.registers.v[opcode.x()] = a << 1;
        self.registers.set_flag(a & 0b1000_0000 != 0);
        Ok(())
    }

    /// 9xy0 - SNE Vx, Vy
    /// Skip next instruction if Vx != Vy.
    pub(crate) fn handle_skip_if_not_equal_register(&mut self, opcode: Opcode) -> Result<()> {
        if self.registers.v[opcode.x()] != self.registers.v[opcode.y()] {
            self.registers.skip();
        }
        Ok(())
    }

    /// Annn - LD I, addr
    /// Set I = nnn.
    pub(crate) fn handle_load_immediate(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.i = opcode.nnn();
        Ok(())
    }

    /// Bnnn - JP V0, addr
    /// Jump to location nnn + V0.
    pub(crate) fn handle_jump_offset(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.pc = opcode.nnn() + self.registers.v[0] as u16;
        Ok(())
    }

    /// Cxkk - RND Vx, byte
    /// Set Vx = random byte AND kk.
    pub(crate) fn handle_random(&mut self, opcode: Opcode) -> Result<()> {
        let value: u8 = self.rng.gen();
        self.registers.v[opcode.x()] = value & opcode.nn();
        Ok(())
    }

    /// Dxyn - DRW Vx, Vy, nibble
    /// Display n-byte sprite starting at memory location I at (Vx, Vy), set VF = collision.
    ///
    /// The interpreter reads n bytes from memory, starting at the address stored in I. These bytes
    /// are then displayed as sprites on screen at coordinates (Vx, Vy). Sprites are XORed onto the
    /// existing screen. If this causes any pixels to be erased, VF is set to 1, otherwise it is set
    /// to 0. If the sprite is positioned so part of it is outside the coordinates of the display, it
    /// wraps around to the opposite side of the screen.
    pub(crate) fn handle_draw_sprite(&mut self, opcode: Opcode) -> Result<()> {
        let origin_x = self.registers.v[opcode.x()] as isize;
        let origin_y = self.registers.v[opcode.y()] as isize;
        self.registers.set_flag(false);

        let mut was_cleared = false;

        for row in 0..opcode.n() {
            let sprite = self.memory.read(self.registers.i.wrapping_add(row as u16));

            for col in 0..8 {
                if sprite & (0b1000_0000 >> col) == 0 {
                    continue;
                }

                if self.display.set_pixel(origin_x + col, origin_y + row as isize) {
                    was_cleared = true;
                }
            }
        }

        self.registers.set_flag(was_cleared);
        self.frame_dirty = true;
        Ok(())
    }

    /// Ex9E - SKP Vx
    /// Skip next instruction if key with the value of Vx is pressed.
    pub(crate) fn handle_skip_if_pressed(&mut self, opcode: Opcode) -> Result<()> {
        if self.keyboard.is_pressed(self.registers.v[opcode.x()]) {
            self.registers.skip();
        }
        Ok(())
    }

    /// ExA1 - SKNP Vx
    /// Skip next instruction if key with the value of Vx is not pressed.
    pub(crate) fn handle_skip_if_not_pressed(&mut self, opcode: Opcode) -> Result<()> {
        if !self.keyboard.is_pressed(self.registers.v[opcode.x()]) {
            self.registers.skip();
        }
        Ok(())
    }

    /// Fx07 - LD Vx, DT
    /// Set Vx = delay timer value.
    pub(crate) fn handle_load_delay(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.v[opcode.x()] = self.registers.delay;
        Ok(())
    }

    /// Fx0A - LD Vx, K
    /// Wait for a key press, store the value of the key in Vx.
    ///
    /// All execution stops until a key is pressed, see [`Interpreter::resolve_waiting_key`].
    pub(crate) fn handle_wait_for_key(&mut self, opcode: Opcode) -> Result<()> {
        log::debug!("Waiting for a key press to store in V{:X}", opcode.x());
        self.state = ExecutionState::AwaitingKey(opcode.x());
        Ok(())
    }

    /// Fx15 - LD DT, Vx
    /// Set delay timer = Vx.
    pub(crate) fn handle_set_delay(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.delay = self.registers.v[opcode.x()];
        Ok(())
    }

    /// Fx18 - LD ST, Vx
    /// Set sound timer = Vx.
    pub(crate) fn handle_set_sound(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.sound = self.registers.v[opcode.x()];
        Ok(())
    }

    /// Fx1E - ADD I, Vx
    /// Set I = I + Vx.
    pub(crate) fn handle_add_index(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.i = self.registers.i.wrapping_add(self.registers.v[opcode.x()] as u16);
        Ok(())
    }

    /// Fx29 - LD F, Vx
    /// Set I = location of sprite for digit Vx.
    pub(crate) fn handle_load_glyph(&mut self, opcode: Opcode) -> Result<()> {
        self.registers.i = self.registers.v[opcode.x()] as u16 * GLYPH_SIZE;
        Ok(())
    }

    /// Fx33 - LD B, Vx
    /// Store BCD representation of Vx in memory locations I, I+1, and I+2.
    ///
    /// The interpreter takes the decimal value of Vx, and places the hundreds digit in memory at
    /// location in I, the tens digit at location I+1, and the ones digit at location I+2.
    pub(crate) fn handle_store_bcd(&mut self, opcode: Opcode) -> Result<()> {
        let value = self.registers.v[opcode.x()];
        let i = self.registers.i;

        self.memory.write(i, value / 100);
        self.memory.write(i.wrapping_add(1), value / 10 % 10);
        self.memory.write(i.wrapping_add(2), value % 10);
        Ok(())
    }

    /// Fx55 - LD [I], Vx
    /// Store registers V0 through Vx in memory starting at location I. I is left unchanged.
    pub(crate) fn handle_store_registers(&mut self, opcode: Opcode) -> Result<()> {
        for idx in 0..=opcode.x() {
            let address = self.registers.i.wrapping_add(idx as u16);
            self.memory.write(address, self.registers.v[idx]);
        }
        Ok(())
    }

    /// Fx65 - LD Vx, [I]
    /// Read registers V0 through Vx from memory starting at location I. I is left unchanged.
    pub(crate) fn handle_load_registers(&mut self, opcode: Opcode) -> Result<()> {
        for idx in 0..=opcode.x() {
            let address = self.registers.i.wrapping_add(idx as u16);
            self.registers.v[idx] = self.memory.read(address);
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
