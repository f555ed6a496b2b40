//! Zapping: one colour bet that flips colour and doubles after every loss.

use super::{SpinOutcome, StrategyEngine};
use rosistrat_types::{
    pocket, Bet, BetSpec, Color, LineOutcome, LineState, Result, SimulationConfig,
};

/// Line id used in records.
pub const LINE_ID: &str = "zapping";

pub struct Zapping;

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub line: LineState,
    /// Colour the next stake goes on.
    pub target: Color,
    /// Losses since the last win.
    pub zap_position: u32,
}

impl State {
    fn aim(&mut self, target: Color) {
        self.target = target;
        self.line.spec.bet = Bet::Color(target);
    }
}

impl StrategyEngine for Zapping {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        Ok(State {
            line: LineState::new(
                LINE_ID,
                BetSpec::new(Bet::Color(Color::Red), 2.0),
                config.zapping_bet,
            ),
            target: Color::Red,
            zap_position: 0,
        })
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let mut next = state.clone();
        let stake = next.line.current_bet;
        let won = next.line.spec.bet.wins(pocket);
        let profit = next.line.settle(won);
        if won {
            next.line.reset();
            next.aim(Color::Red);
            next.zap_position = 0;
        } else {
            next.line.loss_streak += 1;
            next.line.current_bet *= 2.0;
            next.aim(next.target.opposite());
            next.zap_position += 1;
        }

        let mut outcome = SpinOutcome::default();
        outcome.push(LineOutcome::placed(LINE_ID, stake, won), profit);
        Ok((next, outcome))
    }
}
