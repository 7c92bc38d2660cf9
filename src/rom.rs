use std::io::Read;

use crate::emulator::{Error, MAX_ROM_SIZE};

/// Read a whole chip-8 rom.
///
/// Fails with `RomTooLarge` instead of truncating when the source holds
/// more than `MAX_ROM_SIZE` bytes. At most one byte past the limit is
/// consumed, so the reported size is a lower bound.
pub fn read_rom<T>(rom: T) -> Result<Vec<u8>, Error>
where
    T: Read,
{
    // one extra byte is enough to tell an oversized rom apart
    let mut rom = rom.take((MAX_ROM_SIZE + 1) as u64);
    let mut data = Vec::with_capacity(MAX_ROM_SIZE);
    rom.read_to_end(&mut data)?;

    // the rest of the source is never read
    if data.len() > MAX_ROM_SIZE {
        return Err(Error::RomTooLarge {
            size: data.len(),
            max: MAX_ROM_SIZE,
        });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_small_rom() {
        let rom = [0x12u8, 0x00];
        assert_eq!(read_rom(&rom[..]).unwrap(), vec![0x12, 0x00]);
    }

    #[test]
    fn test_read_empty_rom() {
        let rom: [u8; 0] = [];
        assert!(read_rom(&rom[..]).unwrap().is_empty());
    }

    #[test]
    fn test_read_rom_exact() {
        let rom = [0xEE; MAX_ROM_SIZE];
        assert_eq!(read_rom(&rom[..]).unwrap().len(), 3584);
    }

    #[test]
    fn test_read_rom_too_large() {
        let rom = [0xEE; MAX_ROM_SIZE * 2];
        assert!(matches!(
            read_rom(&rom[..]),
            Err(Error::RomTooLarge {
                size: 3585,
                max: 3584
            })
        ));
    }

    /// Endless source that counts how many bytes were handed out
    struct Endless {
        consumed: usize,
    }

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            buf.fill(0xEE);
            self.consumed += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn test_read_rom_stops_after_limit() {
        let mut source = Endless { consumed: 0 };
        assert!(matches!(
            read_rom(&mut source),
            Err(Error::RomTooLarge { size: 3585, .. })
        ));
        assert!(source.consumed <= MAX_ROM_SIZE + 1);
    }

    #[test]
    fn test_read_rom_one_byte_over() {
        let rom = [0xEE; MAX_ROM_SIZE + 1];
        assert!(matches!(
            read_rom(&rom[..]),
            Err(Error::RomTooLarge { size: 3585, .. })
        ));
    }
}
