/// Pockets on a single-zero wheel
pub const POCKETS: usize = 37;

/// Highest number on the wheel
pub const MAX_NUMBER: u8 = 36;

/// Spins generated when a request does not say otherwise
pub const DEFAULT_SEQUENCE_LENGTH: usize = 500;

/// Bankroll used to turn cumulative earnings into a portfolio value
pub const DEFAULT_STARTING_BANKROLL: f64 = 10_000.0;

/// Consecutive losses after which a capped progression restarts
pub const MAX_LOSS_STREAK: u32 = 5;

/// SAM+ never stakes more than this multiple of a line's initial bet
pub const KELLY_BET_CAP_MULTIPLE: f64 = 64.0;

/// Recent outcomes kept per SAM+ line for the empirical win rate
pub const WIN_HISTORY: usize = 10;

/// Trailing cumulative earnings SAM+ inspects for volatility
pub const VOLATILITY_WINDOW: usize = 20;

/// Trailing cumulative earnings SAM+ inspects for drawdown
pub const DRAWDOWN_WINDOW: usize = 10;

/// Fibonacci multipliers for the fibonacci progression (the last entry repeats)
pub const FIBONACCI: [f64; 12] = [
    1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 89.0, 144.0,
];

/// Progress is reported every this many spins (and on the last one)
pub const PROGRESS_INTERVAL: usize = 10;
