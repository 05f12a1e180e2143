use beep::beep;
use std::io;

/// Turns the tone on and off. The host drives it from the interpreter's
/// tone-active signal; the interpreter never owns a sound device.
pub trait Sound {
    fn beep(&mut self) -> Result<(), io::Error>;
    fn stop(&mut self) -> Result<(), io::Error>;
}

pub const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// tone through the PC speaker, via the beep crate
pub struct SimpleBeep {
    pitch: u16,
    is_beeping: bool,
}

impl SimpleBeep {
    /// silences the speaker straight away, so an unusable device is reported
    /// here rather than on the first beep
    pub fn new(pitch: u16) -> Result<Self, io::Error> {
        set_pitch(0)?;
        Ok(SimpleBeep {
            pitch,
            is_beeping: false,
        })
    }
}

fn set_pitch(pitch: u16) -> Result<(), io::Error> {
    beep(pitch).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), io::Error> {
        if !self.is_beeping {
            set_pitch(self.pitch)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        if self.is_beeping {
            set_pitch(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[derive(Default)]
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
