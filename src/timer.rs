/// The delay and sound timers. Both count down toward zero at 60 Hz, driven
/// from outside; neither ever wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// One 60 Hz tick. Returns whether the tone should be sounding for this
    /// tick, sampled before the sound timer is decremented.
    pub fn tick(&mut self) -> bool {
        let tone_active = self.sound > 0;
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        tone_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_samples() {
        let mut t = Timers { delay: 0, sound: 2 };
        let samples: Vec<bool> = (0..3).map(|_| t.tick()).collect();
        assert_eq!(samples, vec![true, true, false]);
        assert_eq!(t.sound, 0);
    }

    #[test]
    fn test_floor_at_zero() {
        let mut t = Timers { delay: 1, sound: 0 };
        assert!(!t.tick());
        assert!(!t.tick());
        assert_eq!(t, Timers { delay: 0, sound: 0 });
    }

    #[test]
    fn test_delay_counts_down() {
        let mut t = Timers { delay: 0xff, sound: 0 };
        for _ in 0..0x10 {
            t.tick();
        }
        assert_eq!(t.delay, 0xef);
    }
}
