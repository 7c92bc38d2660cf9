use crate::emulator::Error;

// memory size
pub const MEM_SIZE: usize = 4096;

// addresses are 12 bits wide; anything above wraps around
const ADDR_MASK: u16 = 0xFFF;

// number of data registers and call stack levels
const NUM_REGISTERS: usize = 16;
const STACK_SIZE: usize = 16;

// start of the free area for user programs
pub const ADDR_START: u16 = 0x200;

/// One of the sixteen data registers, V0 - VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
    pub const V0: Register = Register(0x0);
    pub const VF: Register = Register(0xF);

    /// Register named by the low nibble of `n`.
    pub fn from_nibble(n: u8) -> Self {
        Register(n & 0xF)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

/// 4KB of byte addressable memory.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            bytes: [0u8; MEM_SIZE],
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }

    /// Big-endian word at `addr` and `addr + 1`.
    pub fn read_word(&self, addr: u16) -> u16 {
        let hi = self.read(addr) as u16;
        let lo = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Copy `len` bytes starting at `addr` (wrapping at the end of memory).
    pub fn read_bytes(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len as u16)
            .map(|offset| self.read(addr.wrapping_add(offset)))
            .collect()
    }

    /// Copy `data` into memory starting at `addr` (wrapping at the end of memory).
    pub fn write_bytes(&mut self, addr: u16, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            self.write(addr.wrapping_add(offset as u16), *byte);
        }
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

/// Return address stack.
///
/// Follows the COSMAC layout: `sp` is pre-incremented on push, so slot 0
/// is never written and 15 calls can be nested. `sp` stays within 0..=15.
pub struct Stack {
    slots: [u16; STACK_SIZE],
    sp: u8,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            slots: [0u16; STACK_SIZE],
            sp: 0,
        }
    }

    /// Push a return address. `addr` identifies the CALL for error reporting.
    pub fn push(&mut self, value: u16, addr: u16) -> Result<(), Error> {
        if self.sp as usize >= STACK_SIZE - 1 {
            return Err(Error::StackOverflow { addr });
        }
        self.sp += 1;
        self.slots[self.sp as usize] = value;
        Ok(())
    }

    /// Pop a return address. `addr` identifies the RET for error reporting.
    pub fn pop(&mut self, addr: u16) -> Result<u16, Error> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { addr });
        }
        let value = self.slots[self.sp as usize];
        self.sp -= 1;
        Ok(value)
    }

    #[cfg(test)]
    pub fn sp(&self) -> u8 {
        self.sp
    }
}

/// Architectural state: memory, registers, stack and timers.
#[allow(non_snake_case)]
pub struct Machine {
    // full memory
    pub memory: Memory,

    // data registers: V0 - VF
    V: [u8; NUM_REGISTERS],

    // address register
    pub I: u16,

    // program counter
    pub PC: u16,

    // subroutine stack
    pub stack: Stack,

    // delay timer
    pub DT: u8,

    // sound timer
    pub ST: u8,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            memory: Memory::new(),
            V: [0u8; NUM_REGISTERS],
            I: 0,
            PC: ADDR_START,
            stack: Stack::new(),
            DT: 0,
            ST: 0,
        }
    }

    pub fn reg(&self, r: Register) -> u8 {
        self.V[r.index()]
    }

    pub fn set_reg(&mut self, r: Register, value: u8) {
        self.V[r.index()] = value;
    }

    /// V0 up to and including `last`
    pub fn regs_through(&self, last: Register) -> &[u8] {
        &self.V[..=last.index()]
    }

    pub fn regs_through_mut(&mut self, last: Register) -> &mut [u8] {
        &mut self.V[..=last.index()]
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
