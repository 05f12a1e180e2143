use std::time::Duration;

use crate::sound::SIMPLEBEEP_PITCH;

/// frames, and timer ticks, per second
pub const TIMER_HZ: u32 = 60;

pub const DEFAULT_CYCLES_PER_SECOND: u32 = 500;
pub const DEFAULT_KEY_HOLD_MS: u64 = 100;

/// Runtime settings for the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// instructions executed per wall-clock second
    pub cycles_per_second: u32,
    /// don't touch the speaker
    pub mute: bool,
    /// how long a terminal key press counts as held down
    pub key_hold: Duration,
    pub beep_pitch: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_second: DEFAULT_CYCLES_PER_SECOND,
            mute: false,
            key_hold: Duration::from_millis(DEFAULT_KEY_HOLD_MS),
            beep_pitch: SIMPLEBEEP_PITCH,
        }
    }
}

impl Config {
    /// instructions per 60 Hz frame; never zero, or nothing would run
    pub fn cycles_per_frame(&self) -> u32 {
        (self.cycles_per_second / TIMER_HZ).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cycles_per_frame() {
        assert_eq!(Config::default().cycles_per_frame(), 8);
    }

    #[test]
    fn test_cycles_per_frame_at_least_one() {
        let c = Config {
            cycles_per_second: 10,
            ..Config::default()
        };
        assert_eq!(c.cycles_per_frame(), 1);
    }
}
