//! # chip8
//!
//! A CHIP-8 interpreter core, with a terminal host to run it.
//!
//! ## Design
//!
//! * the interpreter is a plain state machine: `cycle()` runs one instruction,
//!   `tick_timers()` runs one 60 Hz timer tick; it owns no devices
//! * the host (`Environment`) owns the display, input and sound devices, and
//!   paces cycles and timer ticks against the wall clock
//! * guest mistakes that would touch memory outside RAM, or over/underflow the
//!   stack, are faults: the instruction is abandoned and the host stops
//! * unknown instructions are logged and skipped
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter
//!  |    `-- machine state: memory(font, program), registers, stack, timers,
//!  |        framebuffer, keypad, key-wait
//!  `-- main loop, once per 1/60 s
//!       |-- cycles_per_frame x { input.update_keys(keypad); interpreter.cycle() }
//!       |-- tone = interpreter.tick_timers(); sound.beep()/stop() on change
//!       `-- if framebuffer dirty { display.draw(frame); clear the flag }
pub mod config;
pub mod decode;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod state;
pub mod timer;

pub use config::Config;
pub use environment::Environment;
pub use error::{DecodeError, Fault, FaultKind, HostError, LoadError};
pub use interpreter::Chip8Interpreter;
pub use state::{KeyWait, MachineState};
