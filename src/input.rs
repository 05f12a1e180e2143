use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// The 16-key hex keypad. Written by an `Input`, read by the interpreter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    /// only the low nibble of `key` is significant
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[usize::from(key & 0xf)]
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.keys[usize::from(key & 0xf)] = pressed;
    }

    /// lowest-numbered key currently held, if any
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

/// What the person at the keyboard wants the host to do, besides press keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    Reset,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// bring the keypad up to date with the device, returning any host-level
    /// request made since the last call
    fn update_keys(&mut self, keypad: &mut Keypad) -> Result<Action, io::Error>;
}

/// map of keys to what the chip8 might expect, using the left-hand side of a
/// qwerty keyboard:
///
/// ```text
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// keyboard Input using crossterm events in a raw-mode terminal
///
/// Terminals only report presses (and auto-repeats), never releases, so a key
/// counts as held for `hold` after the last event seen for it.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_seen: [Option<Instant>; KEY_COUNT],
    hold: Duration,
}

impl TermInput {
    pub fn new(hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_seen: [None; KEY_COUNT],
            hold,
        })
    }

    fn read_events(&mut self) -> Result<Action, io::Error> {
        let mut action = Action::Continue;
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(KeyEvent { code, modifiers }) => match code {
                    KeyCode::Esc => return Ok(Action::Quit),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(Action::Quit)
                    }
                    KeyCode::Char(' ') => action = Action::Reset,
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => {
                            self.last_seen[usize::from(*mapped_key)] = Some(Instant::now())
                        }
                        None => debug!("can't map {:?} to a hex key", key),
                    },
                    _ => debug!("ignoring key {:?}", code),
                },
                evt => debug!("ignoring event {:?}", evt),
            }
        }
        Ok(action)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn update_keys(&mut self, keypad: &mut Keypad) -> Result<Action, io::Error> {
        let action = self.read_events()?;
        let now = Instant::now();
        for (key, seen) in self.last_seen.iter().enumerate() {
            let held = seen.map_or(false, |t| now.duration_since(t) < self.hold);
            keypad.set(key as u8, held);
        }
        Ok(action)
    }
}

/// dummy Input implementation for testing: holds down a fixed set of keys and
/// asks to quit after a number of updates, if given one
pub struct DummyInput {
    keys: Vec<u8>,
    updates_left: Option<usize>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            updates_left: None,
        }
    }

    pub fn quit_after(mut self, updates: usize) -> Self {
        self.updates_left = Some(updates);
        self
    }
}

impl Input for DummyInput {
    fn update_keys(&mut self, keypad: &mut Keypad) -> Result<Action, io::Error> {
        if let Some(left) = self.updates_left.as_mut() {
            if *left == 0 {
                return Ok(Action::Quit);
            }
            *left -= 1;
        }
        keypad.release_all();
        for key in &self.keys {
            keypad.set(*key, true);
        }
        Ok(Action::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_blank() {
        let k = Keypad::default();
        assert_eq!(k.keys(), &[false; KEY_COUNT]);
        assert_eq!(k.first_pressed(), None);
    }

    #[test]
    fn test_keypad_low_nibble() {
        let mut k = Keypad::default();
        k.set(0x0b, true);
        assert!(k.is_pressed(0x0b));
        assert!(k.is_pressed(0xfb));
        assert!(!k.is_pressed(0x0a));
    }

    #[test]
    fn test_first_pressed_is_lowest() {
        let mut k = Keypad::default();
        k.set(0xe, true);
        k.set(0x3, true);
        assert_eq!(k.first_pressed(), Some(0x3));
        k.release_all();
        assert_eq!(k.first_pressed(), None);
    }

    #[test]
    fn test_keymap_covers_every_key() {
        let mut seen = [false; KEY_COUNT];
        for (_, key) in CHIP8_CONVENTIONAL_KEYMAP {
            seen[usize::from(key)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_dummy_input() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[0x1, 0xf]).quit_after(1);
        let mut k = Keypad::default();
        k.set(0x5, true);
        assert_eq!(input.update_keys(&mut k)?, Action::Continue);
        assert!(k.is_pressed(0x1) && k.is_pressed(0xf));
        assert!(!k.is_pressed(0x5));
        assert_eq!(input.update_keys(&mut k)?, Action::Quit);
        Ok(())
    }
}
