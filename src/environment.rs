use log::info;
use spin_sleep::LoopHelper;

use crate::config::{Config, TIMER_HZ};
use crate::display::Display;
use crate::error::HostError;
use crate::input::{Action, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;

/// Ties the interpreter to its devices and paces it.
///
/// Each 60 Hz frame:
///  - for each of `cycles_per_frame` cycles, refresh the keypad then run one
///    instruction
///  - tick the timers once, switching the tone on or off when it changes
///  - if the framebuffer is dirty, hand it to the display and lower the flag
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    tone: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            config,
            tone: false,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// run frames at 60 Hz until asked to quit or the interpreter faults
    pub fn main_loop(&mut self) -> Result<(), HostError> {
        let mut loop_helper = LoopHelper::builder().build_with_target_rate(TIMER_HZ as f64);
        let result = loop {
            loop_helper.loop_start();
            match self.frame() {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
            loop_helper.loop_sleep();
        };
        self.sound.stop()?;
        result
    }

    /// One frame's worth of work; false once the user has asked to quit.
    pub fn frame(&mut self) -> Result<bool, HostError> {
        for _ in 0..self.config.cycles_per_frame() {
            match self.input.update_keys(self.interpreter.keypad_mut())? {
                Action::Continue => {}
                Action::Reset => {
                    info!("reset");
                    self.interpreter.reset();
                }
                Action::Quit => {
                    info!("quit");
                    return Ok(false);
                }
            }
            self.interpreter.cycle()?;
        }

        let tone = self.interpreter.tick_timers();
        if tone != self.tone {
            if tone {
                self.sound.beep()?;
            } else {
                self.sound.stop()?;
            }
            self.tone = tone;
        }

        if self.interpreter.frame().draw_flag() {
            self.display.draw(self.interpreter.frame())?;
            self.interpreter.clear_draw_flag();
        }
        Ok(true)
    }
}
