//! # interpreter
//!
//! The fetch/decode/execute engine. One call to `cycle()` runs exactly one
//! instruction against the `MachineState`; the host decides how often that
//! happens and separately calls `tick_timers()` at 60 Hz.
//!
//! Register conventions:
//!  V0-VE. general purpose
//!  VF.    flag register; carry, no-borrow, shifted-out bit and collision all
//!         land here, and OR/AND/XOR clear it
//!  I.     address register
//!  PC.    advanced past the instruction before it executes, so jumps, calls
//!         and skips simply overwrite or add to it
//!
//! Faults (out-of-range memory, stack over/underflow) abort the instruction
//! before it changes anything and leave PC on the faulting instruction.
use log::{error, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::decode::Instruction;
use crate::display::{FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::error::{Fault, FaultKind, LoadError};
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::state::{KeyWait, MachineState, STACK_DEPTH, VF};

pub struct Chip8Interpreter {
    state: MachineState,
    rng: StdRng,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Interpreter {
    /// RND is seeded from the wall clock
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Chip8Interpreter {
            state: MachineState::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        self.state.load_program(reader)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.state.keypad
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame
    }

    /// for the presenter, once it has drawn the current frame
    pub fn clear_draw_flag(&mut self) {
        self.state.frame.clear_draw_flag();
    }

    /// 60 Hz timer tick; returns whether the tone should be on
    pub fn tick_timers(&mut self) -> bool {
        self.state.timers.tick()
    }

    /// Fetch, decode and execute one instruction.
    pub fn cycle(&mut self) -> Result<(), Fault> {
        let pc = self.state.pc;
        let word = self
            .state
            .memory
            .get_word(pc)
            .map_err(|kind| self.fault(pc, kind))?;
        self.state.pc = pc.wrapping_add(2);

        match Instruction::decode(word) {
            Ok(instruction) => {
                trace!("{:#05x}: {:04x}  {}", pc, word, instruction);
                if let Err(kind) = self.execute(instruction) {
                    self.state.pc = pc;
                    return Err(self.fault(pc, kind));
                }
            }
            Err(e) => warn!("{} at {:#05x}, skipping", e, pc),
        }
        Ok(())
    }

    fn fault(&self, pc: u16, kind: FaultKind) -> Fault {
        let fault = Fault { pc, kind };
        error!("{}", fault);
        fault
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), FaultKind> {
        use Instruction::*;
        match instruction {
            Cls => self.state.frame.clear(),
            Ret => self.ret()?,
            Jp(addr) => self.state.pc = addr,
            Call(addr) => self.call(addr)?,
            SeByte(x, kk) => self.skip_if(self.state.v[x] == kk),
            SneByte(x, kk) => self.skip_if(self.state.v[x] != kk),
            SeReg(x, y) => self.skip_if(self.state.v[x] == self.state.v[y]),
            LdByte(x, kk) => self.state.v[x] = kk,
            AddByte(x, kk) => self.state.v[x] = self.state.v[x].wrapping_add(kk),
            LdReg(x, y) => self.state.v[x] = self.state.v[y],
            Or(x, y) => self.logical(x, y, |a, b| a | b),
            And(x, y) => self.logical(x, y, |a, b| a & b),
            Xor(x, y) => self.logical(x, y, |a, b| a ^ b),
            AddReg(x, y) => self.add_with_carry(x, y),
            Sub(x, y) => self.sub(x, y),
            Shr(x, y) => self.shift_right(x, y),
            Subn(x, y) => self.subn(x, y),
            Shl(x, y) => self.shift_left(x, y),
            SneReg(x, y) => self.skip_if(self.state.v[x] != self.state.v[y]),
            LdI(addr) => self.state.i = addr,
            JpV0(addr) => self.state.pc = addr + u16::from(self.state.v[0]),
            Rnd(x, kk) => self.state.v[x] = self.rng.gen::<u8>() & kk,
            Drw(x, y, n) => self.draw(x, y, n)?,
            Skp(x) => self.skip_if(self.state.keypad.is_pressed(self.state.v[x])),
            Sknp(x) => self.skip_if(!self.state.keypad.is_pressed(self.state.v[x])),
            LdVxDt(x) => self.state.v[x] = self.state.timers.delay,
            LdVxK(x) => self.wait_for_key(x),
            LdDtVx(x) => self.state.timers.delay = self.state.v[x],
            LdStVx(x) => self.state.timers.sound = self.state.v[x],
            AddI(x) => self.state.i = self.state.i.wrapping_add(u16::from(self.state.v[x])),
            LdF(x) => self.state.i = Chip8MemoryMap::glyph_addr(self.state.v[x]),
            LdB(x) => self.store_bcd(x)?,
            StoreRegs(x) => self.store_regs(x)?,
            LoadRegs(x) => self.load_regs(x)?,
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }

    fn call(&mut self, addr: u16) -> Result<(), FaultKind> {
        let s = &mut self.state;
        if s.sp >= STACK_DEPTH {
            return Err(FaultKind::StackOverflow);
        }
        s.stack[s.sp] = s.pc;
        s.sp += 1;
        s.pc = addr;
        Ok(())
    }

    fn ret(&mut self) -> Result<(), FaultKind> {
        let s = &mut self.state;
        if s.sp == 0 {
            return Err(FaultKind::StackUnderflow);
        }
        s.sp -= 1;
        s.pc = s.stack[s.sp];
        Ok(())
    }

    /// OR/AND/XOR, which also reset VF
    fn logical(&mut self, x: usize, y: usize, op: impl Fn(u8, u8) -> u8) {
        let v = &mut self.state.v;
        v[x] = op(v[x], v[y]);
        v[VF] = 0;
    }

    fn add_with_carry(&mut self, x: usize, y: usize) {
        let v = &mut self.state.v;
        let sum = u16::from(v[x]) + u16::from(v[y]);
        v[x] = sum as u8;
        v[VF] = (sum > 0xff) as u8;
    }

    fn sub(&mut self, x: usize, y: usize) {
        let v = &mut self.state.v;
        let no_borrow = (v[x] >= v[y]) as u8;
        v[x] = v[x].wrapping_sub(v[y]);
        v[VF] = no_borrow;
    }

    fn subn(&mut self, x: usize, y: usize) {
        let v = &mut self.state.v;
        let no_borrow = (v[y] >= v[x]) as u8;
        v[x] = v[y].wrapping_sub(v[x]);
        v[VF] = no_borrow;
    }

    // NB. both shifts take their source from Vy, copying it into Vx first

    fn shift_right(&mut self, x: usize, y: usize) {
        let v = &mut self.state.v;
        let source = v[y];
        v[x] = source >> 1;
        v[VF] = source & 1;
    }

    fn shift_left(&mut self, x: usize, y: usize) {
        let v = &mut self.state.v;
        let source = v[y];
        v[x] = source << 1;
        v[VF] = source >> 7;
    }

    /// Dxyn: the start position wraps, the sprite itself is clipped
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Result<(), FaultKind> {
        let s = &mut self.state;
        let px = usize::from(s.v[x]) % DISPLAY_WIDTH;
        let py = usize::from(s.v[y]) % DISPLAY_HEIGHT;
        // rows below the bottom edge are never fetched
        let rows = usize::from(n).min(DISPLAY_HEIGHT - py);
        let sprite = s.memory.get_ro_slice(s.i, rows)?;
        let collided = s.frame.draw_sprite(px, py, sprite);
        s.v[VF] = collided as u8;
        Ok(())
    }

    /// Fx0A: re-executes itself (PC wound back by 2) until a key has been
    /// pressed and then released
    fn wait_for_key(&mut self, x: usize) {
        let s = &mut self.state;
        match s.key_wait {
            KeyWait::Idle => {
                if let Some(key) = s.keypad.first_pressed() {
                    s.v[x] = key;
                    s.key_wait = KeyWait::AwaitingRelease(x);
                }
            }
            KeyWait::AwaitingRelease(reg) => {
                if !s.keypad.is_pressed(s.v[reg]) {
                    s.key_wait = KeyWait::Idle;
                    return;
                }
            }
        }
        s.pc = s.pc.wrapping_sub(2);
    }

    fn store_bcd(&mut self, x: usize) -> Result<(), FaultKind> {
        let value = self.state.v[x];
        let digits = [value / 100, (value / 10) % 10, value % 10];
        self.state.memory.write(&digits, self.state.i)
    }

    /// Fx55, leaving I just past the last byte written
    fn store_regs(&mut self, x: usize) -> Result<(), FaultKind> {
        let s = &mut self.state;
        s.memory.write(&s.v[..=x], s.i)?;
        s.i = s.i.wrapping_add(x as u16 + 1);
        Ok(())
    }

    /// Fx65, leaving I just past the last byte read
    fn load_regs(&mut self, x: usize) -> Result<(), FaultKind> {
        let s = &mut self.state;
        let bytes = s.memory.get_ro_slice(s.i, x + 1)?;
        s.v[..=x].copy_from_slice(bytes);
        s.i = s.i.wrapping_add(x as u16 + 1);
        Ok(())
    }
}
