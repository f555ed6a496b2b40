//! Fixtures for driving engines with hand-built sequences.

use rosistrat_types::{numbers_where, Bet, Color, SimulationConfig, StrategyId, WHEEL};

/// Smallest number on which `bet` wins.
pub fn winning_number(bet: &Bet) -> u8 {
    WHEEL
        .iter()
        .find(|pocket| bet.wins(pocket))
        .map(|pocket| pocket.number)
        .unwrap_or(0)
}

/// Smallest number on which `bet` loses.
pub fn losing_number(bet: &Bet) -> u8 {
    WHEEL
        .iter()
        .find(|pocket| !bet.wins(pocket))
        .map(|pocket| pocket.number)
        .unwrap_or(0)
}

/// One number per colour, in order (green is zero).
pub fn sequence_of(colors: &[Color]) -> Vec<u8> {
    colors
        .iter()
        .map(|color| numbers_where(|pocket| pocket.color == *color)[0])
        .collect()
}

/// A seeded configuration of `spins` spins.
pub fn seeded_config(strategy: StrategyId, seed: u64, spins: usize) -> SimulationConfig {
    SimulationConfig::new(strategy)
        .with_seed(seed)
        .with_sequence_length(spins)
}
