use std::io::{self, Read};

use crate::error::{FaultKind, LoadError};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable memory of the machine. Every access is bounds
/// checked; nothing ever reads or writes past the end of RAM.
pub trait MemoryMap {
    /// get a r/w slice of the underlying memory (heap)
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], FaultKind>;

    /// get a r/o slice of the underlying memory (heap)
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], FaultKind>;

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), FaultKind> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a single byte
    fn get_byte(&self, addr: u16) -> Result<u8, FaultKind> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16, FaultKind> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// largest ROM that fits between the program address and the top of RAM
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// where the hex digit glyphs live; a second copy sits at 0x000, which is
/// where `LD F, Vx` points
pub const FONT_ADDR: u16 = 0x050;

/// bytes per hex digit glyph
pub const FONT_GLYPH_BYTES: u16 = 5;

/// The CHIP-8 memory map, 4K configuration:
///   0x0000-0x004f  font (LD F copy)
///   0x0050-0x009f  font
///   0x00a0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// the stack, registers and display all live outside addressable memory
#[derive(Clone)]
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], FaultKind> {
        let a = Self::check(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], FaultKind> {
        let a = Self::check(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; RAM_SIZE_BYTES].into_boxed_slice();
        for font in [0, FONT_ADDR as usize] {
            bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        }
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program at 0x200; the whole image is read before any of
    /// it is committed, so a failed load leaves memory as it was. Reading
    /// stops one byte past the limit, so endless sources are rejected too.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        let mut buf = Vec::new();
        let len = reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut buf)?;
        if len > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: len,
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + len].copy_from_slice(&buf);
        Ok(len)
    }

    /// address of the glyph for hex digit `digit`, in the copy at 0x000
    pub fn glyph_addr(digit: u8) -> u16 {
        u16::from(digit) * FONT_GLYPH_BYTES
    }

    fn check(addr: u16, len: usize) -> Result<usize, FaultKind> {
        let a = addr as usize;
        match a.checked_add(len) {
            Some(end) if end <= RAM_SIZE_BYTES => Ok(a),
            _ => Err(FaultKind::OutOfBounds { addr, len }),
        }
    }
}

const CHIP8_FONT: [u8; 80] = [
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the fonts
        assert!(m.bytes[0x200..].iter().all(|b| *b == 0));
        assert_eq!(m.bytes.len(), RAM_SIZE_BYTES);
    }

    #[test]
    fn test_font_resident() -> Result<(), FaultKind> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(FONT_ADDR, 5)?, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.get_ro_slice(0, 80)?, m.get_ro_slice(FONT_ADDR, 80)?);
        assert_eq!(Chip8MemoryMap::glyph_addr(0xA), 50);
        assert_eq!(
            m.get_ro_slice(Chip8MemoryMap::glyph_addr(0xF), 5)?,
            &[0xF0, 0x80, 0xF0, 0x80, 0x80]
        );
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), FaultKind> {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 8)?;
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), FaultKind> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_last_word_ok() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_word(0xffe), Ok(0));
    }

    #[test]
    fn test_read_past_end_faults() {
        let m = Chip8MemoryMap::new();
        assert_eq!(
            m.get_word(0xfff),
            Err(FaultKind::OutOfBounds { addr: 0xfff, len: 2 })
        );
        assert!(m.get_byte(0x1000).is_err());
    }

    #[test]
    fn test_write_too_much_faults_without_writing() {
        let mut dst = Chip8MemoryMap::new();
        let res = dst.write(&[0xaa; 8], 4089);
        assert_eq!(res, Err(FaultKind::OutOfBounds { addr: 4089, len: 8 }));
        assert!(dst.bytes[4089..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2).ok(), Some(&[0x00, 0xe0][..]));
        Ok(())
    }

    #[test]
    fn test_program_load_max_size_ok() {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0x12; MAX_PROGRAM_SIZE];
        assert_eq!(dst.load_program(&mut rom.as_slice()).unwrap(), 3584);
        assert_eq!(dst.bytes[0xfff], 0x12);
    }

    #[test]
    fn test_program_load_too_large_untouched() {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0x12; MAX_PROGRAM_SIZE + 1];
        match dst.load_program(&mut rom.as_slice()) {
            Err(LoadError::TooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
        assert!(dst.bytes[0x200..].iter().all(|b| *b == 0));
    }

    /// counts what's been pulled out of the inner reader
    struct CountingReader<R> {
        inner: R,
        consumed: usize,
    }

    impl<R: io::Read> io::Read for CountingReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.consumed += n;
            Ok(n)
        }
    }

    #[test]
    fn test_program_load_endless_source_rejected() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = CountingReader {
            inner: io::repeat(0x12),
            consumed: 0,
        };
        assert!(matches!(
            dst.load_program(&mut src),
            Err(LoadError::TooLarge { max: 3584, .. })
        ));
        assert!(src.consumed <= MAX_PROGRAM_SIZE + 1);
        assert!(dst.bytes[0x200..].iter().all(|b| *b == 0));
    }
}
