//! SAM+: adaptive compound betting.
//!
//! Every spin SAM+ measures the volatility and drawdown of its recent
//! cumulative earnings and derives a dynamic safety ratio from them. Each line
//! then stakes the smallest of its loss progression, a fractional Kelly stake
//! and a hard cap, pausing when the portfolio cannot cover that stake by the
//! dynamic ratio. Colour lines follow a Markov-style target that leans against
//! whichever colour has dominated recent draws.

use super::{SpinOutcome, StrategyEngine};
use rosistrat_types::{
    pocket, AdaptiveMode, Bet, Color, LineOutcome, LineState, PortfolioAnalytics, Result,
    SimulationConfig, DRAWDOWN_WINDOW, KELLY_BET_CAP_MULTIPLE, MAX_LOSS_STREAK,
    VOLATILITY_WINDOW, WIN_HISTORY,
};
use std::collections::VecDeque;

/// Drawdown above which SAM+ turns conservative.
const CONSERVATIVE_DRAWDOWN: f64 = 0.1;

/// Drawdown below which SAM+ may turn aggressive.
const AGGRESSIVE_DRAWDOWN: f64 = 0.05;

const MAX_DYNAMIC_RATIO: f64 = 10.0;
const MIN_DYNAMIC_RATIO: f64 = 4.0;

/// Colour weights decay once this many spins have been seen.
const MARKOV_DECAY_AFTER: usize = 10;
const MARKOV_DECAY: f64 = 0.9;

pub struct SamPlus;

/// A SAM+ line and its recent results.
#[derive(Clone, Debug, PartialEq)]
pub struct SamLine {
    pub state: LineState,
    /// Last outcomes, newest at the back.
    pub recent: VecDeque<bool>,
    /// Colour lines stake on the Markov target instead of their configured colour.
    pub follows_target: bool,
}

impl SamLine {
    fn win_rate(&self) -> f64 {
        let wins = self.recent.iter().filter(|won| **won).count();
        wins as f64 / self.recent.len() as f64
    }

    /// Full Kelly stake, capped at `portfolio / ratio`.
    ///
    /// Without history the win probability is taken as `1 / m`, the
    /// break-even point, which leaves no edge to stake on.
    pub fn kelly_stake(&self, portfolio: f64, ratio: f64) -> f64 {
        let odds = self.state.spec.payout_multiplier - 1.0;
        if odds <= 0.0 || portfolio <= 0.0 || self.recent.is_empty() {
            return 0.0;
        }
        let p = self.win_rate();
        let q = 1.0 - p;
        let fraction = (odds * p - q) / odds;
        (fraction * portfolio).max(0.0).min(portfolio / ratio)
    }

    /// Stake the loss progression asks for.
    pub fn progression_bet(&self) -> f64 {
        let initial = self.state.initial_bet;
        let streak = self.state.loss_streak;
        match self.state.spec.bet {
            Bet::Single(_) => initial + f64::from(streak),
            _ if streak >= MAX_LOSS_STREAK => initial,
            _ => initial * 2f64.powi(streak as i32),
        }
    }

    fn record(&mut self, won: bool) {
        self.recent.push_back(won);
        while self.recent.len() > WIN_HISTORY {
            self.recent.pop_front();
        }
        if won {
            self.state.loss_streak = 0;
        } else {
            self.state.loss_streak += 1;
            if self.state.loss_streak >= MAX_LOSS_STREAK {
                self.state.loss_streak = 0;
            }
        }
    }
}

/// Colour target that leans against the recently dominant colour.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovTarget {
    pub target: Color,
    pub red_weight: f64,
    pub black_weight: f64,
    pub transition_probability: f64,
    /// Cycles 0-3.
    pub state: u8,
}

impl Default for MarkovTarget {
    fn default() -> Self {
        Self {
            target: Color::Red,
            red_weight: 0.0,
            black_weight: 0.0,
            transition_probability: 0.0,
            state: 0,
        }
    }
}

impl MarkovTarget {
    /// Folds in a drawn colour. Green only advances the cycle.
    pub fn observe(&mut self, color: Color, decay: bool) {
        match color {
            Color::Red => self.red_weight += 1.0,
            Color::Black => self.black_weight += 1.0,
            Color::Green => {}
        }
        if decay {
            self.red_weight *= MARKOV_DECAY;
            self.black_weight *= MARKOV_DECAY;
        }
        let total = self.red_weight + self.black_weight;
        if total > 0.0 {
            let red_bias = self.red_weight / total;
            if red_bias > 0.6 {
                self.target = Color::Black;
            } else if red_bias < 0.4 {
                self.target = Color::Red;
            }
            self.transition_probability = (0.5 - red_bias).abs();
        }
        self.state = (self.state + 1) % 4;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub lines: Vec<SamLine>,
    pub markov: MarkovTarget,
    pub kelly_fraction: f64,
    pub base_safety_ratio: f64,
    pub volatility_threshold: f64,
    pub starting_bankroll: f64,
    pub earnings: f64,
    /// Cumulative earnings after each of the last spins, oldest first.
    pub history: VecDeque<f64>,
}

impl State {
    pub fn portfolio(&self) -> f64 {
        self.starting_bankroll + self.earnings
    }
}

/// Volatility, drawdown and the resulting safety ratio for the next spin.
///
/// `history` holds the cumulative earnings of prior spins (at most the last
/// twenty are read). Returns are spin-to-spin changes relative to `portfolio`;
/// flat spins are ignored.
pub fn portfolio_analytics(
    history: &VecDeque<f64>,
    portfolio: f64,
    base_safety_ratio: f64,
    volatility_threshold: f64,
) -> PortfolioAnalytics {
    let skip = history.len().saturating_sub(VOLATILITY_WINDOW);
    let window: Vec<f64> = history.iter().skip(skip).copied().collect();

    let mut volatility = 0.0;
    let mut recent_drawdown = 0.0;
    if portfolio > 0.0 && window.len() > 1 {
        let returns: Vec<f64> = window
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) / portfolio)
            .filter(|change| *change != 0.0)
            .collect();
        if returns.len() > 1 {
            let mean = returns.iter().sum::<f64>() / returns.len() as f64;
            let variance = returns
                .iter()
                .map(|change| (change - mean).powi(2))
                .sum::<f64>()
                / returns.len() as f64;
            volatility = variance.sqrt();
        }

        let recent = &window[window.len().saturating_sub(DRAWDOWN_WINDOW)..];
        if recent.len() > 1 {
            let peak = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let current = recent[recent.len() - 1];
            recent_drawdown = (peak - current) / portfolio;
        }
    }

    let (dynamic_safety_ratio, adaptive_mode) =
        if volatility > volatility_threshold || recent_drawdown > CONSERVATIVE_DRAWDOWN {
            (
                (base_safety_ratio + 2.0).min(MAX_DYNAMIC_RATIO),
                AdaptiveMode::Conservative,
            )
        } else if volatility < volatility_threshold / 2.0 && recent_drawdown < AGGRESSIVE_DRAWDOWN
        {
            (
                (base_safety_ratio - 1.0).max(MIN_DYNAMIC_RATIO),
                AdaptiveMode::Aggressive,
            )
        } else {
            (base_safety_ratio, AdaptiveMode::Balanced)
        };

    PortfolioAnalytics {
        volatility,
        recent_drawdown,
        dynamic_safety_ratio,
        risk_score: volatility * 10.0 + recent_drawdown * 5.0,
        adaptive_mode,
    }
}

impl StrategyEngine for SamPlus {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        let lines = config
            .line_set()
            .iter()
            .map(|line| {
                line.validate()?;
                let spec = line.spec()?;
                Ok(SamLine {
                    follows_target: matches!(spec.bet, Bet::Color(_)),
                    state: LineState::new(line.id.clone(), spec, line.initial_bet),
                    recent: VecDeque::with_capacity(WIN_HISTORY),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(State {
            lines,
            markov: MarkovTarget::default(),
            kelly_fraction: config.kelly_fraction,
            base_safety_ratio: config.base_safety_ratio,
            volatility_threshold: config.volatility_threshold,
            starting_bankroll: config.starting_bankroll,
            earnings: 0.0,
            history: VecDeque::with_capacity(VOLATILITY_WINDOW),
        })
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let portfolio = state.portfolio();
        let analytics = portfolio_analytics(
            &state.history,
            portfolio,
            state.base_safety_ratio,
            state.volatility_threshold,
        );
        let ratio = analytics.dynamic_safety_ratio;

        let mut next = state.clone();
        let mut outcome = SpinOutcome::default();
        for line in next.lines.iter_mut() {
            if line.follows_target {
                line.state.spec.bet = Bet::Color(state.markov.target);
            }
            let kelly = line.kelly_stake(portfolio, ratio) * state.kelly_fraction;
            let cap = line.state.initial_bet * KELLY_BET_CAP_MULTIPLE;
            let stake = line.progression_bet().min(kelly).min(cap).max(0.0);
            if portfolio < ratio * stake {
                line.state.is_paused = true;
                outcome.push(LineOutcome::paused(&line.state.id), 0.0);
                continue;
            }

            line.state.is_paused = false;
            line.state.current_bet = stake;
            let won = line.state.spec.bet.wins(pocket);
            let profit = line.state.settle(won);
            line.record(won);
            outcome.push(LineOutcome::placed(&line.state.id, stake, won), profit);
        }

        // Only after resolution, so the target never sees the draw it bets on.
        next.markov
            .observe(pocket.color, state.history.len() > MARKOV_DECAY_AFTER);
        next.earnings += outcome.net_result;
        next.history.push_back(next.earnings);
        while next.history.len() > VOLATILITY_WINDOW {
            next.history.pop_front();
        }
        outcome.analytics = Some(analytics);
        Ok((next, outcome))
    }
}
