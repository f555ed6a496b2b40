//! Standard Martingale: red only, double after each loss, reset on a win.

use super::{SpinOutcome, StrategyEngine};
use rosistrat_types::{
    pocket, Bet, BetSpec, Color, LineOutcome, LineState, Result, SimulationConfig,
};

/// Line id used in records.
pub const LINE_ID: &str = "red";

pub struct StandardMartingale;

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub line: LineState,
    pub current_round: u64,
    pub max_bet_reached: f64,
    /// Cycles completed by a win.
    pub total_resets: u64,
    /// Longest losing run that was eventually recovered.
    pub max_streak_survived: u32,
}

impl StrategyEngine for StandardMartingale {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        Ok(State {
            line: LineState::new(
                LINE_ID,
                BetSpec::new(Bet::Color(Color::Red), 2.0),
                config.base_bet,
            ),
            current_round: 0,
            max_bet_reached: config.base_bet,
            total_resets: 0,
            max_streak_survived: 0,
        })
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let mut next = state.clone();
        let stake = next.line.current_bet;
        let won = next.line.spec.bet.wins(pocket);
        let profit = next.line.settle(won);
        if won {
            next.max_streak_survived = next.max_streak_survived.max(next.line.loss_streak);
            next.total_resets += 1;
            next.line.reset();
        } else {
            next.line.loss_streak += 1;
            next.line.current_bet *= 2.0;
            next.max_bet_reached = next.max_bet_reached.max(next.line.current_bet);
        }
        next.current_round += 1;

        let mut outcome = SpinOutcome::default();
        outcome.push(LineOutcome::placed(LINE_ID, stake, won), profit);
        Ok((next, outcome))
    }
}
