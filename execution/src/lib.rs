//! Outcome generation, strategy engines and post-run analytics.
//!
//! A simulation is a spin sequence from the [`generator`] fed one number at a
//! time through an [`engine`] by the [`runner`]. Engines are pure functions of
//! their state and the drawn number, so a seed and a configuration fully
//! determine a run.

pub mod analytics;
pub mod batch;
pub mod engine;
pub mod generator;
pub mod rng;
pub mod runner;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod integration_tests;

pub use analytics::{analyze_streaks, number_frequency, summarize, RunSummary, StreakAnalysis};
pub use batch::{compare, run_batch, Comparison, MultiSimTracker};
pub use engine::{init_engine, step_engine, EngineState, SpinOutcome, StrategyEngine};
pub use generator::OutcomeGenerator;
pub use runner::{run, run_with_observer, simulate, simulate_with_observer, RunObserver};
