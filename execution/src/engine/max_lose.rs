//! Max Lose: five lines that progress on loss and give up after five in a row.

use super::{SpinOutcome, StrategyEngine};
use rosistrat_types::{
    pocket, Bet, LineOutcome, LineState, Result, SimulationConfig, MAX_LOSS_STREAK,
};

pub struct MaxLose;

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub lines: Vec<LineState>,
}

/// Stake after `line` loses: straight-up lines add one unit per loss, the rest double.
fn next_bet_after_loss(line: &LineState) -> f64 {
    match line.spec.bet {
        Bet::Single(_) => line.initial_bet + f64::from(line.loss_streak),
        _ => line.current_bet * 2.0,
    }
}

impl StrategyEngine for MaxLose {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        let lines = config
            .line_set()
            .iter()
            .map(|line| {
                line.validate()?;
                Ok(LineState::new(line.id.clone(), line.spec()?, line.initial_bet))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(State { lines })
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let mut next = state.clone();
        let mut outcome = SpinOutcome::default();
        for line in next.lines.iter_mut() {
            let stake = line.current_bet;
            let won = line.spec.bet.wins(pocket);
            let profit = line.settle(won);
            if won {
                line.reset();
            } else {
                line.loss_streak += 1;
                if line.loss_streak >= MAX_LOSS_STREAK {
                    line.reset();
                } else {
                    line.current_bet = next_bet_after_loss(line);
                }
            }
            outcome.push(LineOutcome::placed(&line.id, stake, won), profit);
        }
        Ok((next, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosistrat_types::StrategyId;

    fn init() -> State {
        MaxLose::init(&SimulationConfig::new(StrategyId::MaxLose)).unwrap()
    }

    fn red_line(state: &State) -> &LineState {
        &state.lines[0]
    }

    #[test]
    fn test_max_lose_forced_reset() {
        let mut state = init();
        // 2 is black: red loses five times
        let mut bets = Vec::new();
        for _ in 0..5 {
            let (next, outcome) = MaxLose::step(&state, 2).unwrap();
            bets.push(outcome.lines[0].bet);
            state = next;
        }
        assert_eq!(bets, [18.0, 36.0, 72.0, 144.0, 288.0]);

        // Forced back to the opening stake
        assert_eq!(red_line(&state).current_bet, 18.0);
        assert_eq!(red_line(&state).loss_streak, 0);
    }

    #[test]
    fn test_max_lose_zero_line_additive() {
        let mut state = init();
        let mut bets = Vec::new();
        for _ in 0..6 {
            // 2 never hits zero
            let (next, outcome) = MaxLose::step(&state, 2).unwrap();
            bets.push(outcome.lines[4].bet);
            state = next;
        }
        assert_eq!(bets, [1.0, 2.0, 3.0, 4.0, 5.0, 1.0]);
    }

    #[test]
    fn test_max_lose_win_resets() {
        let mut state = init();
        for number in [2, 4] {
            state = MaxLose::step(&state, number).unwrap().0;
        }
        assert_eq!(red_line(&state).current_bet, 72.0);
        let (state, outcome) = MaxLose::step(&state, 1).unwrap();
        assert!(outcome.lines[0].won);
        assert_eq!(outcome.lines[0].bet, 72.0);
        assert_eq!(red_line(&state).current_bet, 18.0);
    }

    #[test]
    fn test_max_lose_zero_spin() {
        let (_, outcome) = MaxLose::step(&init(), 0).unwrap();
        // Four 18 stakes lost, zero pays 35
        assert_eq!(outcome.net_result, 35.0 - 72.0);
    }
}
