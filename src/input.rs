/// A key on the hexadecimal keypad, 0x0 - 0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key(u8);

impl Key {
    /// Key named by the low nibble of `n`.
    pub fn from_nibble(n: u8) -> Self {
        Key(n & 0xF)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Anything that can tell whether a keypad key is being held down.
pub trait Keypad {
    fn is_key_down(&self, key: Key) -> bool;
}

/// Keypad state fed by host key events.
#[derive(Debug, Default)]
pub struct KeyState {
    keys: [bool; 16],
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys[key.0 as usize] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.keys[key.0 as usize] = false;
    }

    /// Release every key
    pub fn reset(&mut self) {
        self.keys = [false; 16];
    }
}

impl Keypad for KeyState {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys[key.0 as usize]
    }
}
