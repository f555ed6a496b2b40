//! Compound Martingale: several independent lines staked on every spin.

use super::{ProgressionLine, SpinOutcome, StrategyEngine};
use rosistrat_types::{pocket, Result, SimulationConfig};

pub struct CompoundMartingale;

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub lines: Vec<ProgressionLine>,
}

impl State {
    pub(crate) fn from_config(config: &SimulationConfig) -> Result<Self> {
        let lines = config
            .line_set()
            .iter()
            .map(ProgressionLine::from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { lines })
    }
}

impl StrategyEngine for CompoundMartingale {
    type State = State;

    fn init(config: &SimulationConfig) -> Result<State> {
        State::from_config(config)
    }

    fn step(state: &State, number: u8) -> Result<(State, SpinOutcome)> {
        let pocket = pocket(number)?;
        let mut next = state.clone();
        let mut outcome = SpinOutcome::default();
        for line in next.lines.iter_mut() {
            let (line_outcome, profit) = line.play(pocket);
            outcome.push(line_outcome, profit);
        }
        Ok((next, outcome))
    }
}
