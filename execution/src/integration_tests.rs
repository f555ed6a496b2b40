//! Integration tests for full simulation runs.
//!
//! These tests drive every strategy through generated and hand-built
//! sequences and check the invariants that must hold on every spin.

#[cfg(test)]
mod tests {
    use crate::analytics::summarize;
    use crate::engine::init_engine;
    use crate::generator::{continuation_probability, OutcomeGenerator};
    use crate::mocks::{losing_number, seeded_config, sequence_of, winning_number};
    use crate::runner::{run, simulate};
    use proptest::prelude::*;
    use rosistrat_types::{
        Bet, Color, SimulationConfig, SimulationRun, StrategyId, StreakConfig, WHEEL,
    };
    use std::collections::HashMap;

    fn multipliers(config: &SimulationConfig) -> HashMap<String, f64> {
        init_engine(config)
            .unwrap()
            .lines()
            .into_iter()
            .map(|line| (line.id.clone(), line.spec.payout_multiplier))
            .collect()
    }

    /// Checks the per-spin bookkeeping every run must satisfy.
    fn assert_invariants(run: &SimulationRun) {
        let multipliers = multipliers(&run.config);
        let mut previous = 0.0;
        for (index, record) in run.records.iter().enumerate() {
            assert_eq!(record.spin, index + 1);
            assert_eq!(record.cumulative_earnings, previous + record.net_result);
            previous = record.cumulative_earnings;

            let mut net = 0.0;
            for line in &record.lines {
                assert!(line.bet >= 0.0, "negative bet on {}", line.id);
                if line.paused {
                    assert_eq!(line.bet, 0.0);
                    assert!(!line.won);
                }
                let multiplier = multipliers[&line.id];
                net += if line.won {
                    line.bet * (multiplier - 1.0)
                } else {
                    -line.bet
                };
            }
            assert_eq!(record.net_result, net);
        }
    }

    /// Longest run of one non-green colour.
    fn longest_color_run(numbers: &[u8]) -> usize {
        color_runs(numbers).into_iter().max().unwrap_or(0)
    }

    fn color_runs(numbers: &[u8]) -> Vec<usize> {
        let mut runs = Vec::new();
        let mut current = 0;
        let mut previous = Color::Green;
        for number in numbers {
            let color = WHEEL[*number as usize].color;
            if color != Color::Green && color == previous {
                current += 1;
            } else {
                if current > 0 {
                    runs.push(current);
                }
                current = usize::from(color != Color::Green);
            }
            previous = color;
        }
        if current > 0 {
            runs.push(current);
        }
        runs
    }

    /// Test that every strategy is reproducible from its seed.
    #[test]
    fn test_determinism_all_strategies() {
        for strategy in StrategyId::ALL {
            let config = seeded_config(strategy, 42, 300);
            let first = simulate(&config).unwrap();
            let second = simulate(&config).unwrap();
            assert_eq!(first, second, "{strategy} diverged");
            assert_invariants(&first);
        }
    }

    #[test]
    fn test_seed_42_standard_martingale() {
        let mut config = seeded_config(StrategyId::StandardMartingale, 42, 10);
        config.base_bet = 5.0;
        let run = simulate(&config).unwrap();
        assert_eq!(run.len(), 10);
        assert_eq!(run, simulate(&config).unwrap());
        assert_invariants(&run);

        // Every stake is the base bet after a win, double the last one after a loss
        let mut expected = 5.0;
        for record in &run.records {
            let line = &record.lines[0];
            assert_eq!(line.bet, expected);
            let red = WHEEL[record.number as usize].color == Color::Red;
            assert_eq!(line.won, red);
            expected = if line.won { 5.0 } else { expected * 2.0 };
        }
    }

    #[test]
    fn test_standard_martingale_reset() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale);
        let sequence = sequence_of(&[Color::Black, Color::Green, Color::Black, Color::Red, Color::Red]);
        let run = run(&sequence, &config).unwrap();
        let bets: Vec<f64> = run.records.iter().map(|record| record.lines[0].bet).collect();
        assert_eq!(bets, [5.0, 10.0, 20.0, 40.0, 5.0]);
        assert_eq!(run.final_earnings(), 10.0);
    }

    #[test]
    fn test_max_lose_forced_reset_every_line() {
        let config = SimulationConfig::new(StrategyId::MaxLose);
        for (index, line) in config.line_set().iter().enumerate() {
            let bet = line.bet().unwrap();
            if matches!(bet, Bet::Single(_)) {
                continue;
            }
            let sequence = vec![losing_number(&bet); 6];
            let run = run(&sequence, &config).unwrap();
            let bets: Vec<f64> = run
                .records
                .iter()
                .map(|record| record.lines[index].bet)
                .collect();
            let b = line.initial_bet;
            assert_eq!(bets, [b, 2.0 * b, 4.0 * b, 8.0 * b, 16.0 * b, b], "{}", line.id);
        }
    }

    #[test]
    fn test_safe_compound_pause_leaves_line_untouched() {
        let mut config = SimulationConfig::new(StrategyId::SafeCompoundMartingale);
        config.starting_bankroll = 100.0;
        // Zero keeps winning while the doubled stakes outgrow the portfolio
        let number = losing_number(&Bet::Dozen(1));
        let run = run(&[number; 4], &config).unwrap();
        assert_invariants(&run);

        let mut earnings = 0.0;
        for record in &run.records {
            let portfolio_before = config.portfolio(earnings);
            earnings = record.cumulative_earnings;
            for line in &record.lines {
                if line.paused {
                    assert!(record.paused_lines().any(|id| id == line.id));
                } else {
                    assert!(portfolio_before >= config.safety_ratio * line.bet);
                }
            }
        }
        assert!(run.records.iter().any(|record| record.paused_lines().count() > 0));
    }

    #[test]
    fn test_sam_plus_respects_caps() {
        for seed in 0..5 {
            let config = seeded_config(StrategyId::SamPlus, seed, 500);
            let run = simulate(&config).unwrap();
            assert_invariants(&run);
            let initial: HashMap<_, _> = config
                .line_set()
                .into_iter()
                .map(|line| (line.id, line.initial_bet))
                .collect();
            let mut earnings = 0.0;
            for record in &run.records {
                let analytics = record.analytics.expect("SAM+ attaches analytics");
                let portfolio_before = config.portfolio(earnings);
                earnings = record.cumulative_earnings;
                for line in record.lines.iter().filter(|line| !line.paused) {
                    assert!(line.bet <= initial[&line.id] * 64.0);
                    assert!(portfolio_before >= analytics.dynamic_safety_ratio * line.bet);
                }
            }
        }
    }

    #[test]
    fn test_zapping_alternates_after_losses() {
        let config = SimulationConfig::new(StrategyId::Zapping);
        // Red target loses on black, black target loses on red
        let sequence = sequence_of(&[Color::Black, Color::Red, Color::Black, Color::Black]);
        let run = run(&sequence, &config).unwrap();
        let bets: Vec<f64> = run.records.iter().map(|record| record.lines[0].bet).collect();
        assert_eq!(bets, [5.0, 10.0, 20.0, 40.0]);
        let won: Vec<bool> = run.records.iter().map(|record| record.lines[0].won).collect();
        assert_eq!(won, [false, false, false, true]);
        assert_eq!(run.final_earnings(), 5.0);
    }

    #[test]
    fn test_compound_lines_override() {
        let mut config = SimulationConfig::new(StrategyId::CompoundMartingale);
        let mut line = rosistrat_types::LineConfig::new(
            "third_column",
            "3rd Column",
            10.0,
            rosistrat_types::BetType::Column,
            "3",
            3.0,
            rosistrat_types::Progression::Fibonacci,
        );
        line.max_bet = Some(25.0);
        config.lines = Some(vec![line]);
        let column = Bet::Column(3);
        let sequence = [
            losing_number(&column),
            losing_number(&column),
            losing_number(&column),
            losing_number(&column),
            winning_number(&column),
        ];
        let run = run(&sequence, &config).unwrap();
        let bets: Vec<f64> = run.records.iter().map(|record| record.lines[0].bet).collect();
        assert_eq!(bets, [10.0, 10.0, 20.0, 25.0, 25.0]);
        assert_eq!(run.final_earnings(), -65.0 + 50.0);
    }

    #[test]
    fn test_streak_amplifier_active() {
        let mut amplified_long = 0;
        let mut uniform_long = 0;
        let mut amplified_longest = 0;
        let mut uniform_longest = 0;
        for seed in 0..3 {
            let amplified = OutcomeGenerator::new(seed, StreakConfig::default()).generate(100_000);
            let uniform = OutcomeGenerator::new(seed, StreakConfig::disabled()).generate(100_000);
            amplified_long += color_runs(&amplified).into_iter().filter(|run| *run >= 6).count();
            uniform_long += color_runs(&uniform).into_iter().filter(|run| *run >= 6).count();
            amplified_longest += longest_color_run(&amplified);
            uniform_longest += longest_color_run(&uniform);
        }
        assert!(
            amplified_long * 2 > uniform_long * 3,
            "{amplified_long} vs {uniform_long}"
        );
        assert!(amplified_longest > uniform_longest);

        for streak in 0..200 {
            let probability = continuation_probability(streak, 1.2);
            assert!((0.15..=0.65).contains(&probability));
        }
    }

    #[test]
    fn test_summary_matches_run() {
        let run = simulate(&seeded_config(StrategyId::CompoundMartingale, 7, 200)).unwrap();
        let summary = summarize(&run);
        assert_eq!(summary.total_spins, 200);
        assert_eq!(summary.final_earnings, run.final_earnings());
        assert_eq!(summary.total_wagered, run.total_wagered());
        assert!(summary.min_portfolio <= summary.final_portfolio);
        assert!(summary.max_portfolio >= summary.final_portfolio);
        assert!((0.0..=1.0).contains(&summary.win_rate));
    }

    #[test]
    fn test_run_json_shape() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale).with_seed(3);
        let sequence = sequence_of(&[Color::Black, Color::Black, Color::Red]);
        let run = run(&sequence, &config).unwrap();

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["strategy"], "standard_martingale");
        assert_eq!(json["config"]["sequenceLength"], 500);
        assert_eq!(json["records"][2]["cumulativeEarnings"], 5.0);
        assert_eq!(json["records"][1]["lines"][0]["bet"], 10.0);
        assert!(json["records"][0].get("analytics").is_none());

        let decoded: SimulationRun = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, run);

        let summary = serde_json::to_value(summarize(&run)).unwrap();
        assert_eq!(summary["totalSpins"], 3);
        assert_eq!(summary["maxBets"][0]["maxBet"], 20.0);
        assert_eq!(summary["drawdown"]["lowestEarnings"], -15.0);
    }

    fn any_strategy_id() -> impl Strategy<Value = StrategyId> {
        prop::sample::select(StrategyId::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_invariants_hold_for_any_sequence(
            strategy in any_strategy_id(),
            sequence in prop::collection::vec(0u8..=36, 0..200),
            bankroll in -500.0f64..20_000.0,
        ) {
            let mut config = SimulationConfig::new(strategy);
            config.starting_bankroll = bankroll;
            let run = run(&sequence, &config).unwrap();
            prop_assert_eq!(run.len(), sequence.len());
            prop_assert_eq!(run.numbers(), sequence);
            assert_invariants(&run);
        }

        #[test]
        fn test_out_of_range_numbers_rejected(
            strategy in any_strategy_id(),
            number in 37u8..,
        ) {
            let config = SimulationConfig::new(strategy);
            prop_assert!(run(&[1, number], &config).is_err());
        }
    }
}
