//! Running several simulations at once.

use crate::generator::OutcomeGenerator;
use crate::runner::run;
use rosistrat_types::{Result, SimulationConfig, SimulationRun, StrategyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Every strategy run against one shared sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub seed: u64,
    pub sequence: Vec<u8>,
    pub runs: Vec<SimulationRun>,
}

/// Runs all six strategies on the sequence `config` generates.
///
/// Strategy-specific settings (ratios, line overrides) are shared; fixed-line
/// strategies ignore line overrides.
pub fn compare(config: &SimulationConfig) -> Result<Comparison> {
    config.validate()?;
    let mut generator = OutcomeGenerator::from_config(config);
    let seed = generator.seed();
    let sequence = generator.generate(config.sequence_length);
    let configs: Vec<SimulationConfig> = StrategyId::ALL
        .into_iter()
        .map(|strategy| config.for_strategy(strategy).with_seed(seed))
        .collect();
    debug!(seed, spins = sequence.len(), "comparing strategies");

    #[cfg(feature = "parallel")]
    let runs = configs
        .par_iter()
        .map(|config| run(&sequence, config))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let runs = configs
        .iter()
        .map(|config| run(&sequence, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(Comparison {
        seed,
        sequence,
        runs,
    })
}

/// Simulates each configuration independently, each on its own sequence.
pub fn run_batch(configs: &[SimulationConfig]) -> Vec<Result<SimulationRun>> {
    #[cfg(feature = "parallel")]
    {
        configs.par_iter().map(crate::runner::simulate).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        configs.iter().map(crate::runner::simulate).collect()
    }
}

/// Average final earnings of one strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAverage {
    pub strategy: StrategyId,
    pub runs: usize,
    pub average_earnings: f64,
}

/// Final earnings collected across repeated runs, per strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSimTracker {
    results: BTreeMap<StrategyId, Vec<f64>>,
}

impl MultiSimTracker {
    pub fn record(&mut self, strategy: StrategyId, final_earnings: f64) {
        self.results.entry(strategy).or_default().push(final_earnings);
    }

    pub fn record_run(&mut self, run: &SimulationRun) {
        self.record(run.strategy, run.final_earnings());
    }

    pub fn results(&self, strategy: StrategyId) -> &[f64] {
        self.results
            .get(&strategy)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mean of the recorded results, zero when there are none.
    pub fn average(&self, strategy: StrategyId) -> f64 {
        let results = self.results(strategy);
        if results.is_empty() {
            return 0.0;
        }
        results.iter().sum::<f64>() / results.len() as f64
    }

    pub fn averages(&self) -> Vec<StrategyAverage> {
        self.results
            .iter()
            .map(|(strategy, results)| StrategyAverage {
                strategy: *strategy,
                runs: results.len(),
                average_earnings: self.average(*strategy),
            })
            .collect()
    }

    pub fn reset(&mut self, strategy: StrategyId) {
        self.results.remove(&strategy);
    }

    pub fn reset_all(&mut self) {
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_shares_sequence() {
        let config = SimulationConfig::default()
            .with_seed(42)
            .with_sequence_length(100);
        let comparison = compare(&config).unwrap();
        assert_eq!(comparison.seed, 42);
        assert_eq!(comparison.runs.len(), StrategyId::ALL.len());
        for (run, strategy) in comparison.runs.iter().zip(StrategyId::ALL) {
            assert_eq!(run.strategy, strategy);
            assert_eq!(run.numbers(), comparison.sequence);
        }

        // Same seed, same comparison
        assert_eq!(compare(&config).unwrap(), comparison);
    }

    #[test]
    fn test_compare_ignores_lines_for_fixed_strategies() {
        let mut config = SimulationConfig::new(StrategyId::CompoundMartingale)
            .with_seed(1)
            .with_sequence_length(20);
        config.lines = Some(rosistrat_types::max_lose_lines());
        let comparison = compare(&config).unwrap();
        let zapping = &comparison.runs[2];
        assert_eq!(zapping.line_ids(), vec!["zapping".to_string()]);
    }

    #[test]
    fn test_run_batch() {
        let configs: Vec<_> = StrategyId::ALL
            .into_iter()
            .map(|strategy| {
                SimulationConfig::new(strategy)
                    .with_seed(7)
                    .with_sequence_length(30)
            })
            .collect();
        let runs = run_batch(&configs);
        assert_eq!(runs.len(), 6);
        for (result, config) in runs.into_iter().zip(&configs) {
            let run = result.unwrap();
            assert_eq!(run.strategy, config.strategy);
            assert_eq!(run.len(), 30);
        }

        let mut invalid = SimulationConfig::default();
        invalid.kelly_fraction = 2.0;
        assert!(run_batch(&[invalid])[0].is_err());
    }

    #[test]
    fn test_multi_sim_tracker() {
        let mut tracker = MultiSimTracker::default();
        assert_eq!(tracker.average(StrategyId::SamPlus), 0.0);

        tracker.record(StrategyId::SamPlus, 100.0);
        tracker.record(StrategyId::SamPlus, -50.0);
        tracker.record(StrategyId::Zapping, 10.0);
        assert_eq!(tracker.average(StrategyId::SamPlus), 25.0);
        assert_eq!(tracker.results(StrategyId::SamPlus), [100.0, -50.0]);

        let averages = tracker.averages();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].strategy, StrategyId::Zapping);

        tracker.reset(StrategyId::SamPlus);
        assert!(tracker.results(StrategyId::SamPlus).is_empty());
        tracker.reset_all();
        assert!(tracker.averages().is_empty());
    }
}
