//! Strategy engines.
//!
//! Each strategy is a pure state machine: `init` builds its starting state from
//! a [`SimulationConfig`] and `step` consumes one drawn number, returning the
//! next state alongside what happened on that spin. Engines never see future
//! draws.
//!
//! - Compound Martingale
//! - Max Lose
//! - Zapping
//! - Safe Compound Martingale
//! - SAM+
//! - Standard Martingale

pub mod compound;
mod line;
pub mod max_lose;
pub mod safe_compound;
pub mod sam_plus;
pub mod standard;
pub mod zapping;

pub use line::ProgressionLine;

use rosistrat_types::{
    LineOutcome, LineState, PortfolioAnalytics, Result, SimulationConfig, SpinRecord, StrategyId,
};

/// Per-spin result of a single engine step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpinOutcome {
    pub net_result: f64,
    pub lines: Vec<LineOutcome>,
    pub analytics: Option<PortfolioAnalytics>,
}

impl SpinOutcome {
    /// Adds a line's outcome and its profit (negative for a loss).
    pub fn push(&mut self, outcome: LineOutcome, profit: f64) {
        self.net_result += profit;
        self.lines.push(outcome);
    }

    pub fn into_record(self, spin: usize, number: u8, cumulative_earnings: f64) -> SpinRecord {
        SpinRecord {
            spin,
            number,
            net_result: self.net_result,
            cumulative_earnings,
            lines: self.lines,
            analytics: self.analytics,
        }
    }
}

/// Trait for strategy engines.
pub trait StrategyEngine {
    type State: Clone;

    /// Build the starting state.
    fn init(config: &SimulationConfig) -> Result<Self::State>;

    /// Resolve one drawn number.
    fn step(state: &Self::State, number: u8) -> Result<(Self::State, SpinOutcome)>;
}

/// State of whichever engine a configuration selected.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineState {
    CompoundMartingale(compound::State),
    MaxLose(max_lose::State),
    Zapping(zapping::State),
    SafeCompoundMartingale(safe_compound::State),
    SamPlus(sam_plus::State),
    StandardMartingale(standard::State),
}

impl EngineState {
    pub fn strategy(&self) -> StrategyId {
        match self {
            Self::CompoundMartingale(_) => StrategyId::CompoundMartingale,
            Self::MaxLose(_) => StrategyId::MaxLose,
            Self::Zapping(_) => StrategyId::Zapping,
            Self::SafeCompoundMartingale(_) => StrategyId::SafeCompoundMartingale,
            Self::SamPlus(_) => StrategyId::SamPlus,
            Self::StandardMartingale(_) => StrategyId::StandardMartingale,
        }
    }

    /// Current state of every line, in play order.
    pub fn lines(&self) -> Vec<&LineState> {
        match self {
            Self::CompoundMartingale(state) => state.lines.iter().map(|line| &line.state).collect(),
            Self::MaxLose(state) => state.lines.iter().collect(),
            Self::Zapping(state) => vec![&state.line],
            Self::SafeCompoundMartingale(state) => {
                state.lines.iter().map(|line| &line.state).collect()
            }
            Self::SamPlus(state) => state.lines.iter().map(|line| &line.state).collect(),
            Self::StandardMartingale(state) => vec![&state.line],
        }
    }
}

/// Initialize the engine selected by `config.strategy`.
pub fn init_engine(config: &SimulationConfig) -> Result<EngineState> {
    config.validate()?;
    Ok(match config.strategy {
        StrategyId::CompoundMartingale => {
            EngineState::CompoundMartingale(compound::CompoundMartingale::init(config)?)
        }
        StrategyId::MaxLose => EngineState::MaxLose(max_lose::MaxLose::init(config)?),
        StrategyId::Zapping => EngineState::Zapping(zapping::Zapping::init(config)?),
        StrategyId::SafeCompoundMartingale => EngineState::SafeCompoundMartingale(
            safe_compound::SafeCompoundMartingale::init(config)?,
        ),
        StrategyId::SamPlus => EngineState::SamPlus(sam_plus::SamPlus::init(config)?),
        StrategyId::StandardMartingale => {
            EngineState::StandardMartingale(standard::StandardMartingale::init(config)?)
        }
    })
}

/// Advance an engine by one drawn number.
pub fn step_engine(state: &EngineState, number: u8) -> Result<(EngineState, SpinOutcome)> {
    Ok(match state {
        EngineState::CompoundMartingale(state) => {
            let (next, outcome) = compound::CompoundMartingale::step(state, number)?;
            (EngineState::CompoundMartingale(next), outcome)
        }
        EngineState::MaxLose(state) => {
            let (next, outcome) = max_lose::MaxLose::step(state, number)?;
            (EngineState::MaxLose(next), outcome)
        }
        EngineState::Zapping(state) => {
            let (next, outcome) = zapping::Zapping::step(state, number)?;
            (EngineState::Zapping(next), outcome)
        }
        EngineState::SafeCompoundMartingale(state) => {
            let (next, outcome) = safe_compound::SafeCompoundMartingale::step(state, number)?;
            (EngineState::SafeCompoundMartingale(next), outcome)
        }
        EngineState::SamPlus(state) => {
            let (next, outcome) = sam_plus::SamPlus::step(state, number)?;
            (EngineState::SamPlus(next), outcome)
        }
        EngineState::StandardMartingale(state) => {
            let (next, outcome) = standard::StandardMartingale::step(state, number)?;
            (EngineState::StandardMartingale(next), outcome)
        }
    })
}
