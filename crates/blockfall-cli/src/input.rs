use std::time::Duration;

use blockfall_engine::{Command, PieceSeed, TimedCommand};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

/// Keeps the input stream independent of the piece stream for the same seed.
const INPUT_SEED_SALT: u128 = 0x5eed_0f1a_7eb1_0cf4;

/// Endless stream of random commands at a fixed interval.
///
/// Lateral moves and rotations are weighted above drops so pieces spread
/// across the board instead of stacking in the middle.
#[derive(Debug, Clone)]
pub struct RandomInput {
    rng: Pcg32,
    interval: Duration,
    next_at: Duration,
}

impl RandomInput {
    pub fn new(seed: PieceSeed, interval: Duration) -> Self {
        let rng = Pcg32::from_seed((seed.as_u128() ^ INPUT_SEED_SALT).to_le_bytes());
        Self {
            rng,
            interval,
            next_at: interval,
        }
    }
}

impl Iterator for RandomInput {
    type Item = TimedCommand;

    fn next(&mut self) -> Option<Self::Item> {
        let command = match self.rng.random_range(0..10) {
            0..=2 => Command::MoveLeft,
            3..=5 => Command::MoveRight,
            6..=7 => Command::Rotate,
            8 => Command::MoveDown,
            _ => Command::HardDrop,
        };
        let at = self.next_at;
        self.next_at = self.next_at.saturating_add(self.interval);
        Some(TimedCommand::new(at, command))
    }
}
