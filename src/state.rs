use std::io;

use crate::display::FrameBuffer;
use crate::error::LoadError;
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, PROGRAM_ADDR};
use crate::timer::Timers;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// index of the flag register
pub const VF: usize = 0xf;

/// Progress through an `Fx0A` key wait. Lives in the machine state so the
/// wait survives across cycles and is cleared by a reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyWait {
    #[default]
    Idle,
    /// a key was pressed and stored in this register; waiting for it to go up
    AwaitingRelease(usize),
}

/// Everything the machine knows.
#[derive(Clone)]
pub struct MachineState {
    pub memory: Chip8MemoryMap,
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub stack: [u16; STACK_DEPTH],
    /// next free stack slot
    pub sp: usize,
    pub timers: Timers,
    pub frame: FrameBuffer,
    pub keypad: Keypad,
    pub key_wait: KeyWait,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        MachineState {
            memory: Chip8MemoryMap::new(),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
            timers: Timers::default(),
            frame: FrameBuffer::default(),
            keypad: Keypad::default(),
            key_wait: KeyWait::Idle,
        }
    }

    /// Back to power-on state, except memory: the font and any loaded program
    /// stay where they are.
    pub fn reset(&mut self) {
        self.v = [0; REGISTER_COUNT];
        self.i = 0;
        self.pc = PROGRAM_ADDR;
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.timers = Timers::default();
        self.frame.reset();
        self.keypad.release_all();
        self.key_wait = KeyWait::Idle;
    }

    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        self.memory.load_program(reader)
    }
}
