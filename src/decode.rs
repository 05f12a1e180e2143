//! # decode
//!
//! Field extraction from a 16-bit instruction word, and decoding of the word
//! into one of the 35 instructions of the classic CHIP-8 set.
//!
//! ```text
//!   15   12 11    8 7     4 3     0
//!  +-------+-------+-------+-------+
//!  |  op   |   x   |   y   |   n   |
//!  +-------+-------+-------+-------+
//!          |<--------- nnn ------->|
//!                  |<---- kk ----->|
//! ```
use std::fmt;

use crate::error::DecodeError;

/// A raw instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Word(pub u16);

impl Word {
    pub fn opcode(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn x(self) -> usize {
        usize::from((self.0 >> 8) & 0xf)
    }

    pub fn y(self) -> usize {
        usize::from((self.0 >> 4) & 0xf)
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xf) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

/// A decoded instruction. Register operands are indices into `V`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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
    SeByte(usize, u8),
    /// 4xkk
    SneByte(usize, u8),
    /// 5xy0
    SeReg(usize, usize),
    /// 6xkk
    LdByte(usize, u8),
    /// 7xkk
    AddByte(usize, u8),
    /// 8xy0
    LdReg(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    AddReg(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    Shr(usize, usize),
    /// 8xy7
    Subn(usize, usize),
    /// 8xyE
    Shl(usize, usize),
    /// 9xy0
    SneReg(usize, usize),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(usize, u8),
    /// Dxyn
    Drw(usize, usize, u8),
    /// Ex9E
    Skp(usize),
    /// ExA1
    Sknp(usize),
    /// Fx07
    LdVxDt(usize),
    /// Fx0A
    LdVxK(usize),
    /// Fx15
    LdDtVx(usize),
    /// Fx18
    LdStVx(usize),
    /// Fx1E
    AddI(usize),
    /// Fx29
    LdF(usize),
    /// Fx33
    LdB(usize),
    /// Fx55
    StoreRegs(usize),
    /// Fx65
    LoadRegs(usize),
}

impl Instruction {
    /// Branches on the top nibble, then on `n` or `kk` for the multiplexed
    /// families. `5xy0` and `9xy0` ignore their low nibble.
    pub fn decode(word: u16) -> Result<Instruction, DecodeError> {
        use Instruction::*;
        let w = Word(word);
        let (x, y) = (w.x(), w.y());
        let ins = match w.opcode() {
            0x0 => match word {
                0x00e0 => Cls,
                0x00ee => Ret,
                _ => return Err(DecodeError::UnknownInstruction(word)),
            },
            0x1 => Jp(w.nnn()),
            0x2 => Call(w.nnn()),
            0x3 => SeByte(x, w.kk()),
            0x4 => SneByte(x, w.kk()),
            0x5 => SeReg(x, y),
            0x6 => LdByte(x, w.kk()),
            0x7 => AddByte(x, w.kk()),
            0x8 => match w.n() {
                0x0 => LdReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => Shr(x, y),
                0x7 => Subn(x, y),
                0xe => Shl(x, y),
                _ => return Err(DecodeError::UnknownInstruction(word)),
            },
            0x9 => SneReg(x, y),
            0xa => LdI(w.nnn()),
            0xb => JpV0(w.nnn()),
            0xc => Rnd(x, w.kk()),
            0xd => Drw(x, y, w.n()),
            0xe => match w.kk() {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => return Err(DecodeError::UnknownInstruction(word)),
            },
            0xf => match w.kk() {
                0x07 => LdVxDt(x),
                0x0a => LdVxK(x),
                0x15 => LdDtVx(x),
                0x18 => LdStVx(x),
                0x1e => AddI(x),
                0x29 => LdF(x),
                0x33 => LdB(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return Err(DecodeError::UnknownInstruction(word)),
            },
            _ => unreachable!("opcode is a nibble"),
        };
        Ok(ins)
    }
}

/// Conventional assembler mnemonics, used for trace logging.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SeByte(x, k) => write!(f, "SE V{:X}, {:#04x}", x, k),
            SneByte(x, k) => write!(f, "SNE V{:X}, {:#04x}", x, k),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, k) => write!(f, "LD V{:X}, {:#04x}", x, k),
            AddByte(x, k) => write!(f, "ADD V{:X}, {:#04x}", x, k),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, {:#05x}", a),
            JpV0(a) => write!(f, "JP V0, {:#05x}", a),
            Rnd(x, k) => write!(f, "RND V{:X}, {:#04x}", x, k),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdVxDt(x) => write!(f, "LD V{:X}, DT", x),
            LdVxK(x) => write!(f, "LD V{:X}, K", x),
            LdDtVx(x) => write!(f, "LD DT, V{:X}", x),
            LdStVx(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            LdB(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let w = Word(0xd12f);
        assert_eq!(w.opcode(), 0xd);
        assert_eq!(w.x(), 0x1);
        assert_eq!(w.y(), 0x2);
        assert_eq!(w.n(), 0xf);
        assert_eq!(w.nnn(), 0x12f);
        assert_eq!(w.kk(), 0x2f);
    }

    #[test]
    fn test_decode_families() {
        assert_eq!(Instruction::decode(0x00e0), Ok(Instruction::Cls));
        assert_eq!(Instruction::decode(0x00ee), Ok(Instruction::Ret));
        assert_eq!(Instruction::decode(0x1abc), Ok(Instruction::Jp(0xabc)));
        assert_eq!(Instruction::decode(0x2abc), Ok(Instruction::Call(0xabc)));
        assert_eq!(Instruction::decode(0x8ab6), Ok(Instruction::Shr(0xa, 0xb)));
        assert_eq!(Instruction::decode(0x8abe), Ok(Instruction::Shl(0xa, 0xb)));
        assert_eq!(Instruction::decode(0xd125), Ok(Instruction::Drw(1, 2, 5)));
        assert_eq!(Instruction::decode(0xe39e), Ok(Instruction::Skp(3)));
        assert_eq!(Instruction::decode(0xe3a1), Ok(Instruction::Sknp(3)));
        assert_eq!(Instruction::decode(0xf40a), Ok(Instruction::LdVxK(4)));
        assert_eq!(Instruction::decode(0xf765), Ok(Instruction::LoadRegs(7)));
    }

    #[test]
    fn test_decode_ignores_low_nibble_of_reg_compares() {
        assert_eq!(Instruction::decode(0x5127), Ok(Instruction::SeReg(1, 2)));
        assert_eq!(Instruction::decode(0x9121), Ok(Instruction::SneReg(1, 2)));
    }

    #[test]
    fn test_decode_unknown() {
        for word in [0x0000, 0x0123, 0x8008, 0x800f, 0xe000, 0xf000, 0xf0ff] {
            assert_eq!(
                Instruction::decode(word),
                Err(DecodeError::UnknownInstruction(word))
            );
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Instruction::Jp(0x200).to_string(), "JP 0x200");
        assert_eq!(Instruction::LdByte(0xa, 0x0f).to_string(), "LD VA, 0x0f");
        assert_eq!(Instruction::Drw(0, 1, 8).to_string(), "DRW V0, V1, 8");
        assert_eq!(Instruction::StoreRegs(3).to_string(), "LD [I], V3");
    }
}
