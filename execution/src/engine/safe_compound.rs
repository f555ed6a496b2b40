//! Safe Compound Martingale: Compound Martingale with a bankroll guard.
//!
//! A line only stakes when the portfolio (starting bankroll plus earnings so
//! far) is at least `safety_ratio` times its current bet. Otherwise it sits
//! the spin out with its stake and progression untouched.

use super::{compound, ProgressionLine, SpinOutcome, StrategyEngine};
use rosistrat_types::{pocket, Result, SimulationConfig};
use tracing::debug;

pub struct SafeCompoundMartingale;

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub lines: Vec<ProgressionLine>,
    pub safety_ratio: f64,
    pub starting_bankroll: f64,
    pub earnings: f64,
}

impl State {
    pub fn portfolio(&self) -> f64 {
        self.starting_bankroll + self.earnings
    }
}

impl StrategyEngine for SafeCompoundMartingale {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        let compound = compound::State::from_config(config)?;
        Ok(State {
            lines: compound.lines,
            safety_ratio: config.safety_ratio,
            starting_bankroll: config.starting_bankroll,
            earnings: 0.0,
        })
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let portfolio = state.portfolio();
        let mut next = state.clone();
        let mut outcome = SpinOutcome::default();
        for line in next.lines.iter_mut() {
            if portfolio >= state.safety_ratio * line.state.current_bet {
                let (line_outcome, profit) = line.play(pocket);
                outcome.push(line_outcome, profit);
            } else {
                debug!(
                    line = %line.state.id,
                    bet = line.state.current_bet,
                    portfolio,
                    "pausing line below safety ratio"
                );
                outcome.push(line.pause(), 0.0);
            }
        }
        next.earnings += outcome.net_result;
        Ok((next, outcome))
    }
}
