use std::io;
use thiserror::Error;

/// Why a ROM image could not be loaded. Memory is left untouched in every case.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("can't read ROM: {0}")]
    Io(#[from] io::Error),

    #[error("ROM is too large (read {size} bytes), max size is {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// An instruction word that matches nothing in the instruction set. Never fatal.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown instruction {0:#06X}")]
    UnknownInstruction(u16),
}

/// What went wrong inside a faulting instruction.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FaultKind {
    #[error("memory access out of bounds: {len} byte(s) at {addr:#06X}")]
    OutOfBounds { addr: u16, len: usize },

    #[error("stack overflow: CALL with a full stack")]
    StackOverflow,

    #[error("stack underflow: RET with an empty stack")]
    StackUnderflow,
}

/// A fatal fault raised by one execution cycle. `pc` is the address of the
/// instruction that faulted; the program counter is left pointing at it.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("fault at {pc:#05X}: {kind}")]
pub struct Fault {
    pub pc: u16,
    pub kind: FaultKind,
}

/// Everything that can stop the host driver.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("device error: {0}")]
    Device(#[from] io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fault(#[from] Fault),
}
