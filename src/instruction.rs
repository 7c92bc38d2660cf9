use std::fmt;

use crate::emulator::Error;
use crate::machine::Register;

#[inline(always)]
fn nibble_h(b: u8) -> u8 {
    (b >> 4) & 0xF
}

#[inline(always)]
fn nibble_l(b: u8) -> u8 {
    b & 0xF
}

#[inline(always)]
fn nnn(a: u8, b: u8) -> u16 {
    (((a as u16) << 8) | (b as u16)) & 0xFFF
}

/// A decoded chip-8 instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeByte(Register, u8),
    /// 4xkk
    SneByte(Register, u8),
    /// 5xy0
    SeReg(Register, Register),
    /// 6xkk
    LdByte(Register, u8),
    /// 7xkk
    AddByte(Register, u8),
    /// 8xy0
    LdReg(Register, Register),
    /// 8xy1
    Or(Register, Register),
    /// 8xy2
    And(Register, Register),
    /// 8xy3
    Xor(Register, Register),
    /// 8xy4
    AddReg(Register, Register),
    /// 8xy5
    Sub(Register, Register),
    /// 8xy6
    Shr(Register),
    /// 8xy7
    Subn(Register, Register),
    /// 8xyE
    Shl(Register),
    /// 9xy0
    SneReg(Register, Register),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(Register, u8),
    /// Dxyn
    Drw(Register, Register, u8),
    /// Ex9E
    Skp(Register),
    /// ExA1
    Sknp(Register),
    /// Fx07
    LdFromDt(Register),
    /// Fx0A
    LdKey(Register),
    /// Fx15
    LdDt(Register),
    /// Fx18
    LdSt(Register),
    /// Fx1E
    AddI(Register),
    /// Fx29
    LdFont(Register),
    /// Fx33
    Bcd(Register),
    /// Fx55
    Store(Register),
    /// Fx65
    Load(Register),
}

/// Decode an instruction word fetched from `addr`.
///
/// Dispatches on the high nibble, then on the low nibble (family 8) or the
/// low byte (families E and F).
pub fn decode(opcode: u16, addr: u16) -> Result<Instruction, Error> {
    use Instruction::*;

    let [a, b] = opcode.to_be_bytes();
    let x = Register::from_nibble(nibble_l(a));
    let y = Register::from_nibble(nibble_h(b));
    let n = nibble_l(b);

    let instr = match nibble_h(a) {
        0x0 => match opcode {
            0x00E0 => Cls,
            0x00EE => Ret,
            _ => return Err(Error::UnknownOpcode { opcode, addr }),
        },
        0x1 => Jp(nnn(a, b)),
        0x2 => Call(nnn(a, b)),
        0x3 => SeByte(x, b),
        0x4 => SneByte(x, b),
        0x5 if n == 0x0 => SeReg(x, y),
        0x6 => LdByte(x, b),
        0x7 => AddByte(x, b),
        0x8 => match n {
            0x0 => LdReg(x, y),
            0x1 => Or(x, y),
            0x2 => And(x, y),
            0x3 => Xor(x, y),
            0x4 => AddReg(x, y),
            0x5 => Sub(x, y),
            0x6 => Shr(x),
            0x7 => Subn(x, y),
            0xE => Shl(x),
            _ => return Err(Error::UnknownOpcode { opcode, addr }),
        },
        0x9 if n == 0x0 => SneReg(x, y),
        0xA => LdI(nnn(a, b)),
        0xB => JpV0(nnn(a, b)),
        0xC => Rnd(x, b),
        0xD => Drw(x, y, n),
        0xE => match b {
            0x9E => Skp(x),
            0xA1 => Sknp(x),
            _ => return Err(Error::UnknownOpcode { opcode, addr }),
        },
        0xF => match b {
            0x07 => LdFromDt(x),
            0x0A => LdKey(x),
            0x15 => LdDt(x),
            0x18 => LdSt(x),
            0x1E => AddI(x),
            0x29 => LdFont(x),
            0x33 => Bcd(x),
            0x55 => Store(x),
            0x65 => Load(x),
            _ => return Err(Error::UnknownOpcode { opcode, addr }),
        },
        _ => return Err(Error::UnknownOpcode { opcode, addr }),
    };

    Ok(instr)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(addr) => write!(f, "JP {:#05X}", addr),
            Call(addr) => write!(f, "CALL {:#05X}", addr),
            SeByte(x, kk) => write!(f, "SE {}, {:#04X}", x, kk),
            SneByte(x, kk) => write!(f, "SNE {}, {:#04X}", x, kk),
            SeReg(x, y) => write!(f, "SE {}, {}", x, y),
            LdByte(x, kk) => write!(f, "LD {}, {:#04X}", x, kk),
            AddByte(x, kk) => write!(f, "ADD {}, {:#04X}", x, kk),
            LdReg(x, y) => write!(f, "LD {}, {}", x, y),
            Or(x, y) => write!(f, "OR {}, {}", x, y),
            And(x, y) => write!(f, "AND {}, {}", x, y),
            Xor(x, y) => write!(f, "XOR {}, {}", x, y),
            AddReg(x, y) => write!(f, "ADD {}, {}", x, y),
            Sub(x, y) => write!(f, "SUB {}, {}", x, y),
            Shr(x) => write!(f, "SHR {}", x),
            Subn(x, y) => write!(f, "SUBN {}, {}", x, y),
            Shl(x) => write!(f, "SHL {}", x),
            SneReg(x, y) => write!(f, "SNE {}, {}", x, y),
            LdI(addr) => write!(f, "LD I, {:#05X}", addr),
            JpV0(addr) => write!(f, "JP V0, {:#05X}", addr),
            Rnd(x, kk) => write!(f, "RND {}, {:#04X}", x, kk),
            Drw(x, y, n) => write!(f, "DRW {}, {}, {}", x, y, n),
            Skp(x) => write!(f, "SKP {}", x),
            Sknp(x) => write!(f, "SKNP {}", x),
            LdFromDt(x) => write!(f, "LD {}, DT", x),
            LdKey(x) => write!(f, "LD {}, K", x),
            LdDt(x) => write!(f, "LD DT, {}", x),
            LdSt(x) => write!(f, "LD ST, {}", x),
            AddI(x) => write!(f, "ADD I, {}", x),
            LdFont(x) => write!(f, "LD F, {}", x),
            Bcd(x) => write!(f, "LD B, {}", x),
            Store(x) => write!(f, "LD [I], {}", x),
            Load(x) => write!(f, "LD {}, [I]", x),
        }
    }
}
