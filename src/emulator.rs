use log::{debug, trace, warn};
use nanorand::{BufferedRng, Rng, WyRand};
use thiserror::Error;

use crate::{
    beep::Audio,
    display::Framebuffer,
    input::{Key, Keypad},
    instruction::{decode, Instruction},
    machine::{Machine, Register, ADDR_START, MEM_SIZE},
};

// start of the sprite data
const FONTSET_START: u16 = 0;

// bytes per built-in glyph
const GLYPH_SIZE: u16 = 5;

/// Built-in hexadecimal glyphs, 0 - F.
pub const FONTSET: [u8; 80] = [
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

// rom size
pub const MAX_ROM_SIZE: usize = MEM_SIZE - ADDR_START as usize;

#[derive(Error, Debug)]
pub enum Error {
    #[error("ROM is too large: {size} bytes read, at most {max} bytes fit in memory")]
    RomTooLarge { size: usize, max: usize },
    #[error("Unknown opcode {opcode:04X} at address {addr:#05X}")]
    UnknownOpcode { opcode: u16, addr: u16 },
    #[error("Stack overflow on call at address {addr:#05X}")]
    StackOverflow { addr: u16 },
    #[error("Stack underflow on return at address {addr:#05X}")]
    StackUnderflow { addr: u16 },
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CpuState {
    Running,
    // suspended by FX0A until a key goes down
    AwaitingKey(Register),
}

pub struct Emulator {
    // registers, memory, stack and timers
    machine: Machine,

    // screen contents
    display: Framebuffer,

    state: CpuState,

    // random number generator
    rng: BufferedRng<WyRand, 8>,
}

impl Emulator {
    pub fn new() -> Self {
        Emulator {
            machine: Machine::new(),
            display: Framebuffer::new(),
            state: CpuState::Running,
            rng: BufferedRng::new(WyRand::new()),
        }
    }

    /// Copy the glyph table to the start of memory.
    pub fn load_fontset(&mut self, fontset: &[u8; 80]) {
        self.machine.memory.write_bytes(FONTSET_START, &fontset[..]);
    }

    /// Copy a program to the user area of memory.
    ///
    /// Nothing is written if the program does not fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > MAX_ROM_SIZE {
            return Err(Error::RomTooLarge {
                size: program.len(),
                max: MAX_ROM_SIZE,
            });
        }

        self.machine.memory.write_bytes(ADDR_START, program);
        Ok(())
    }

    pub fn display(&self) -> &Framebuffer {
        &self.display
    }

    /// True while an FX0A instruction waits for a key press
    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, CpuState::AwaitingKey(_))
    }

    /// Report a key press event from the host.
    ///
    /// Resumes execution if the program is waiting for a key.
    pub fn key_down(&mut self, key: Key) {
        if let CpuState::AwaitingKey(x) = self.state {
            debug!("key {:X} pressed, resuming with {} = {:X}", key.value(), x, key.value());
            self.machine.set_reg(x, key.value());
            self.state = CpuState::Running;
        }
    }

    /// Count down both timers and update the tone. Call at 60Hz.
    pub fn tick_timers<A: Audio + ?Sized>(&mut self, audio: &mut A) {
        let m = &mut self.machine;
        m.DT = m.DT.saturating_sub(1);
        m.ST = m.ST.saturating_sub(1);
        audio.set_tone(m.ST > 0);
    }

    /// Execute a single chip-8 CPU instruction.
    ///
    /// Does nothing while waiting for a key. Unknown opcodes are logged and
    /// skipped; stack errors stop the program with PC on the faulty instruction.
    pub fn step<K: Keypad + ?Sized>(&mut self, keypad: &K) -> Result<(), Error> {
        if self.is_awaiting_key() {
            return Ok(());
        }

        // read a command
        let addr = self.machine.PC;
        let opcode = self.machine.memory.read_word(addr);
        self.machine.PC = addr.wrapping_add(2);

        let instr = match decode(opcode, addr) {
            Ok(instr) => instr,
            Err(err) => {
                warn!("{}", err);
                return Ok(());
            }
        };
        trace!("{:#05X}: {:04X}  {}", addr, opcode, instr);

        let result = self.execute(instr, addr, keypad);
        if result.is_err() {
            self.machine.PC = addr;
        }
        result
    }

    fn execute<K: Keypad + ?Sized>(
        &mut self,
        instr: Instruction,
        addr: u16,
        keypad: &K,
    ) -> Result<(), Error> {
        use Instruction::*;

        let m = &mut self.machine;

        match instr {
            Cls => self.display.clear(),
            Ret => {
                m.PC = m.stack.pop(addr)?;
            }
            Jp(nnn) => m.PC = nnn,
            Call(nnn) => {
                m.stack.push(m.PC, addr)?;
                m.PC = nnn;
            }
            SeByte(x, kk) => {
                if m.reg(x) == kk {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            SneByte(x, kk) => {
                if m.reg(x) != kk {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            SeReg(x, y) => {
                if m.reg(x) == m.reg(y) {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            SneReg(x, y) => {
                if m.reg(x) != m.reg(y) {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            LdByte(x, kk) => m.set_reg(x, kk),
            AddByte(x, kk) => m.set_reg(x, m.reg(x).wrapping_add(kk)),
            LdReg(x, y) => m.set_reg(x, m.reg(y)),
            Or(x, y) => m.set_reg(x, m.reg(x) | m.reg(y)),
            And(x, y) => m.set_reg(x, m.reg(x) & m.reg(y)),
            Xor(x, y) => m.set_reg(x, m.reg(x) ^ m.reg(y)),
            // flag first, so the result wins when X is VF
            AddReg(x, y) => {
                let (result, carry) = m.reg(x).overflowing_add(m.reg(y));
                m.set_reg(Register::VF, carry as u8);
                m.set_reg(x, result);
            }
            // VF is 1 only when VX is strictly greater, equal operands give 0
            Sub(x, y) => {
                let (vx, vy) = (m.reg(x), m.reg(y));
                m.set_reg(Register::VF, (vx > vy) as u8);
                m.set_reg(x, vx.wrapping_sub(vy));
            }
            Shr(x) => {
                let vx = m.reg(x);
                m.set_reg(Register::VF, vx & 1);
                m.set_reg(x, vx >> 1);
            }
            Subn(x, y) => {
                let (vx, vy) = (m.reg(x), m.reg(y));
                m.set_reg(Register::VF, (vy > vx) as u8);
                m.set_reg(x, vy.wrapping_sub(vx));
            }
            Shl(x) => {
                let vx = m.reg(x);
                m.set_reg(Register::VF, (vx >> 7) & 1);
                m.set_reg(x, vx << 1);
            }
            LdI(nnn) => m.I = nnn,
            JpV0(nnn) => m.PC = nnn + m.reg(Register::V0) as u16,
            Rnd(x, kk) => {
                let mut n = [0u8; 1];
                self.rng.fill(&mut n);
                m.set_reg(x, n[0] & kk);
            }
            Drw(x, y, n) => {
                let sprite = m.memory.read_bytes(m.I, n as usize);
                let (vx, vy) = (m.reg(x) as usize, m.reg(y) as usize);

                m.set_reg(Register::VF, 0);
                if self.display.draw_sprite(vx, vy, &sprite) {
                    m.set_reg(Register::VF, 1);
                }
            }
            Skp(x) => {
                if keypad.is_key_down(Key::from_nibble(m.reg(x))) {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            Sknp(x) => {
                if !keypad.is_key_down(Key::from_nibble(m.reg(x))) {
                    m.PC = m.PC.wrapping_add(2);
                }
            }
            LdFromDt(x) => m.set_reg(x, m.DT),
            LdKey(x) => {
                debug!("waiting for a key to store in {}", x);
                self.state = CpuState::AwaitingKey(x);
            }
            LdDt(x) => m.DT = m.reg(x),
            LdSt(x) => m.ST = m.reg(x),
            AddI(x) => m.I = m.I.wrapping_add(m.reg(x) as u16),
            LdFont(x) => m.I = FONTSET_START + m.reg(x) as u16 * GLYPH_SIZE,
            Bcd(x) => {
                let vx = m.reg(x);
                let digits = [vx / 100, vx / 10 % 10, vx % 10];
                let i = m.I;
                m.memory.write_bytes(i, &digits);
            }
            // I is left untouched by both bulk transfers
            Store(x) => {
                let values = m.regs_through(x).to_vec();
                let i = m.I;
                m.memory.write_bytes(i, &values);
            }
            Load(x) => {
                let values = m.memory.read_bytes(m.I, x.index() + 1);
                m.regs_through_mut(x).copy_from_slice(&values);
            }
        }

        Ok(())
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
