//! Roulette outcome generation with optional streak amplification.
//!
//! With amplification enabled the generator looks at the trailing window of
//! draws, measures the current colour and parity runs, and with a decaying
//! probability extends the longer of the two. Without it every draw is a
//! uniform pick from 0-36.

use crate::rng::{entropy_seed, SpinRng};
use rosistrat_types::{numbers_where, Color, SimulationConfig, StreakConfig, WHEEL};
use std::collections::VecDeque;
use tracing::debug;

/// Continuation probability before decay.
pub const BASE_CONTINUATION: f64 = 0.48;

/// Continuation probability lost per unit of streak length.
pub const CONTINUATION_DECAY: f64 = 0.04;

/// Floor applied before amplification.
pub const MIN_CONTINUATION: f64 = 0.15;

/// Ceiling applied after amplification.
pub const MAX_CONTINUATION: f64 = 0.65;

/// Probability that a streak of `streak` matching pairs is extended.
///
/// `max(0.15, 0.48 - 0.04 * streak) * amplifier`, capped at 0.65.
pub fn continuation_probability(streak: usize, amplifier: f64) -> f64 {
    if streak == 0 {
        return BASE_CONTINUATION;
    }
    let decayed = (BASE_CONTINUATION - CONTINUATION_DECAY * streak as f64).max(MIN_CONTINUATION);
    (decayed * amplifier).min(MAX_CONTINUATION)
}

/// Colour and parity runs at the end of a window of draws.
///
/// Lengths count consecutive matching *pairs*, so two reds in a row is a run
/// of 1. Green breaks a colour run and zero breaks a parity run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrailingStreaks {
    pub color: usize,
    pub parity: usize,
}

impl TrailingStreaks {
    pub fn longest(&self) -> usize {
        self.color.max(self.parity)
    }
}

pub fn trailing_streaks(window: &[u8]) -> TrailingStreaks {
    let pockets: Vec<_> = window
        .iter()
        .filter_map(|number| WHEEL.get(*number as usize))
        .collect();
    let mut streaks = TrailingStreaks::default();
    for pair in pockets.windows(2).rev() {
        let (previous, current) = (pair[0], pair[1]);
        if current.color != Color::Green && current.color == previous.color {
            streaks.color += 1;
        } else {
            break;
        }
    }
    for pair in pockets.windows(2).rev() {
        let (previous, current) = (pair[0], pair[1]);
        if !current.is_zero() && !previous.is_zero() && current.is_even == previous.is_even {
            streaks.parity += 1;
        } else {
            break;
        }
    }
    streaks
}

/// Produces the spin sequence a simulation runs against.
pub struct OutcomeGenerator {
    rng: SpinRng,
    seed: u64,
    streaks: StreakConfig,
    window: VecDeque<u8>,
}

impl OutcomeGenerator {
    pub fn new(seed: u64, streaks: StreakConfig) -> Self {
        Self {
            rng: SpinRng::new(seed),
            seed,
            window: VecDeque::with_capacity(streaks.window),
            streaks,
        }
    }

    /// Uses the configured seed, or draws one from the clock.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let seed = entropy_seed();
            debug!(seed, "no seed configured, using entropy");
            seed
        });
        Self::new(seed, config.streaks.clone())
    }

    /// Seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_spin(&mut self) -> u8 {
        let number = self.draw();
        self.window.push_back(number);
        while self.window.len() > self.streaks.window {
            self.window.pop_front();
        }
        number
    }

    pub fn generate(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.next_spin()).collect()
    }

    fn draw(&mut self) -> u8 {
        if !self.streaks.enabled {
            return self.rng.spin_roulette();
        }
        let (head, tail) = self.window.as_slices();
        let window: Vec<u8> = head.iter().chain(tail).copied().collect();
        let streaks = trailing_streaks(&window);
        let longest = streaks.longest();
        if longest == 0 {
            return self.rng.spin_roulette();
        }

        let probability = continuation_probability(longest, self.streaks.variance_amplifier);
        if self.rng.next_f64() >= probability {
            return self.rng.spin_roulette();
        }
        let Some(last) = window.last().and_then(|number| WHEEL.get(*number as usize)) else {
            return self.rng.spin_roulette();
        };
        let candidates = if streaks.color >= streaks.parity {
            numbers_where(|pocket| pocket.color == last.color)
        } else {
            numbers_where(|pocket| !pocket.is_zero() && pocket.is_even == last.is_even)
        };
        self.rng
            .choose(&candidates)
            .unwrap_or_else(|| self.rng.spin_roulette())
    }
}

impl Iterator for OutcomeGenerator {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        Some(self.next_spin())
    }
}
