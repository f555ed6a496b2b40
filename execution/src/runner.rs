//! Drives a strategy engine over a spin sequence.

use crate::engine::{init_engine, step_engine};
use crate::generator::OutcomeGenerator;
use rosistrat_types::{
    pocket, Result, SimulationConfig, SimulationRun, PROGRESS_INTERVAL,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Receives progress and may stop a run between spins.
pub trait RunObserver {
    /// Fraction of the sequence completed, in `(0, 1]`.
    fn on_progress(&mut self, _fraction: f64) {}

    /// Checked before every spin; returning true ends the run early.
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Observer that ignores progress and never stops.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Adapts a progress callback.
pub struct ProgressFn<F>(pub F);

impl<F: FnMut(f64)> RunObserver for ProgressFn<F> {
    fn on_progress(&mut self, fraction: f64) {
        (self.0)(fraction)
    }
}

/// Stops the run once the flag is raised.
pub struct CancelFlag<'a>(pub &'a AtomicBool);

impl RunObserver for CancelFlag<'_> {
    fn should_stop(&mut self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Rejects sequences containing anything off the wheel.
pub fn validate_sequence(sequence: &[u8]) -> Result<()> {
    for number in sequence {
        pocket(*number)?;
    }
    Ok(())
}

/// Runs `config.strategy` over `sequence`.
pub fn run(sequence: &[u8], config: &SimulationConfig) -> Result<SimulationRun> {
    run_with_observer(sequence, config, &mut NoopObserver)
}

/// Runs `config.strategy` over `sequence`, reporting to `observer`.
///
/// Progress is reported every few spins and on the last one. If the observer
/// asks to stop, the records completed so far are returned with `cancelled`
/// set.
pub fn run_with_observer(
    sequence: &[u8],
    config: &SimulationConfig,
    observer: &mut dyn RunObserver,
) -> Result<SimulationRun> {
    validate_sequence(sequence)?;
    let mut state = init_engine(config)?;
    debug!(strategy = %config.strategy, spins = sequence.len(), "starting simulation");

    let total = sequence.len();
    let mut records = Vec::with_capacity(total);
    let mut cumulative = 0.0;
    let mut cancelled = false;
    for (index, number) in sequence.iter().enumerate() {
        if observer.should_stop() {
            warn!(strategy = %config.strategy, completed = index, "simulation cancelled");
            cancelled = true;
            break;
        }
        let (next, outcome) = step_engine(&state, *number)?;
        state = next;
        cumulative += outcome.net_result;
        let spin = index + 1;
        records.push(outcome.into_record(spin, *number, cumulative));
        if spin % PROGRESS_INTERVAL == 0 || spin == total {
            observer.on_progress(spin as f64 / total as f64);
        }
    }

    debug!(
        strategy = %config.strategy,
        spins = records.len(),
        final_earnings = cumulative,
        "simulation finished"
    );
    Ok(SimulationRun {
        strategy: config.strategy,
        config: config.clone(),
        records,
        cancelled,
    })
}

/// Generates a sequence from the configuration and runs it.
///
/// The seed actually used is written back into the returned run's config so
/// an unseeded run can be replayed.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationRun> {
    simulate_with_observer(config, &mut NoopObserver)
}

pub fn simulate_with_observer(
    config: &SimulationConfig,
    observer: &mut dyn RunObserver,
) -> Result<SimulationRun> {
    config.validate()?;
    let mut generator = OutcomeGenerator::from_config(config);
    let mut config = config.clone();
    config.seed = Some(generator.seed());
    let sequence = generator.generate(config.sequence_length);
    run_with_observer(&sequence, &config, observer)
}
