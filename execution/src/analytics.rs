//! Post-run statistics.

use rosistrat_types::{Color, Parity, SimulationRun, POCKETS, WHEEL};
use serde::{Deserialize, Serialize};

/// Fraction of spins with a positive net result.
pub fn win_rate(run: &SimulationRun) -> f64 {
    if run.is_empty() {
        return 0.0;
    }
    let wins = run.records.iter().filter(|record| record.is_winning()).count();
    wins as f64 / run.len() as f64
}

/// Final earnings relative to the total amount staked.
pub fn roi(run: &SimulationRun) -> f64 {
    let wagered = run.total_wagered();
    if wagered <= 0.0 {
        return 0.0;
    }
    run.final_earnings() / wagered
}

/// Population standard deviation of per-spin net results.
pub fn volatility(run: &SimulationRun) -> f64 {
    if run.is_empty() {
        return 0.0;
    }
    let n = run.len() as f64;
    let mean = run.final_earnings() / n;
    let variance = run
        .records
        .iter()
        .map(|record| (record.net_result - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Worst point of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawdown {
    /// Lowest cumulative earnings over the run (zero for an empty run).
    pub lowest_earnings: f64,
    /// Largest fall of the portfolio from its running peak, in percent.
    pub peak_to_trough_pct: f64,
}

pub fn max_drawdown(run: &SimulationRun) -> Drawdown {
    let mut drawdown = Drawdown {
        lowest_earnings: run
            .records
            .iter()
            .map(|record| record.cumulative_earnings)
            .reduce(f64::min)
            .unwrap_or(0.0),
        peak_to_trough_pct: 0.0,
    };
    let mut peak = run.config.starting_bankroll;
    for record in &run.records {
        let portfolio = run.config.portfolio(record.cumulative_earnings);
        peak = peak.max(portfolio);
        if peak > 0.0 {
            let fall = (peak - portfolio) / peak * 100.0;
            drawdown.peak_to_trough_pct = drawdown.peak_to_trough_pct.max(fall);
        }
    }
    drawdown
}

/// Largest stake a line placed during the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMaximum {
    pub id: String,
    pub max_bet: f64,
}

/// Headline numbers for a finished run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_spins: usize,
    pub final_earnings: f64,
    pub final_portfolio: f64,
    /// Percent change of the portfolio over the run.
    pub portfolio_growth: f64,
    /// Highest portfolio after any spin; the starting bankroll for an empty run.
    pub max_portfolio: f64,
    /// Lowest portfolio after any spin; the starting bankroll for an empty run.
    pub min_portfolio: f64,
    pub total_wagered: f64,
    pub max_bets: Vec<LineMaximum>,
    pub drawdown: Drawdown,
    pub win_rate: f64,
    pub roi: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
}

pub fn summarize(run: &SimulationRun) -> RunSummary {
    let starting = run.config.starting_bankroll;
    let final_portfolio = run.final_portfolio();
    let portfolio_growth = if starting != 0.0 {
        (final_portfolio / starting - 1.0) * 100.0
    } else {
        0.0
    };

    let portfolios = run
        .records
        .iter()
        .map(|record| run.config.portfolio(record.cumulative_earnings));
    let max_portfolio = portfolios.clone().reduce(f64::max).unwrap_or(starting);
    let min_portfolio = portfolios.reduce(f64::min).unwrap_or(starting);

    let max_bets = run
        .line_ids()
        .into_iter()
        .map(|id| {
            let max_bet = run
                .records
                .iter()
                .filter_map(|record| record.bet_for(&id))
                .fold(0.0, f64::max);
            LineMaximum { id, max_bet }
        })
        .collect();

    let (mut win_streak, mut loss_streak) = (0, 0);
    let (mut max_win_streak, mut max_loss_streak) = (0, 0);
    for record in &run.records {
        if record.net_result > 0.0 {
            win_streak += 1;
            loss_streak = 0;
        } else if record.net_result < 0.0 {
            loss_streak += 1;
            win_streak = 0;
        } else {
            win_streak = 0;
            loss_streak = 0;
        }
        max_win_streak = max_win_streak.max(win_streak);
        max_loss_streak = max_loss_streak.max(loss_streak);
    }

    let volatility = volatility(run);
    let sharpe_ratio = if volatility > 0.0 {
        run.final_earnings() / volatility
    } else {
        run.final_earnings()
    };

    RunSummary {
        total_spins: run.len(),
        final_earnings: run.final_earnings(),
        final_portfolio,
        portfolio_growth,
        max_portfolio,
        min_portfolio,
        total_wagered: run.total_wagered(),
        max_bets,
        drawdown: max_drawdown(run),
        win_rate: win_rate(run),
        roi: roi(run),
        volatility,
        sharpe_ratio,
        max_win_streak,
        max_loss_streak,
    }
}

/// Longest run of one colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStreak {
    pub color: Option<Color>,
    pub length: usize,
    /// Index of the run's first spin.
    pub start: usize,
}

/// Longest run of one parity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityStreak {
    pub parity: Option<Parity>,
    pub length: usize,
    pub start: usize,
}

/// Longest run of one repeated number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberStreak {
    pub number: Option<u8>,
    pub length: usize,
    pub start: usize,
}

/// Streak structure of a spin sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakAnalysis {
    pub longest_color: ColorStreak,
    pub longest_parity: ParityStreak,
    pub longest_number: NumberStreak,
    /// Colour runs longer than five spins.
    pub color_streaks_over_5: usize,
    /// Colour runs longer than ten spins.
    pub color_streaks_over_10: usize,
}

/// Maximal runs of equal keys; `None` breaks a run. Yields (key, start, length).
fn runs<K: PartialEq + Copy>(keys: impl Iterator<Item = Option<K>>) -> Vec<(K, usize, usize)> {
    let mut runs = Vec::new();
    let mut current: Option<(K, usize, usize)> = None;
    for (index, key) in keys.enumerate() {
        current = match (current, key) {
            (Some((last, start, length)), Some(key)) if last == key => Some((last, start, length + 1)),
            (previous, key) => {
                if let Some(finished) = previous {
                    runs.push(finished);
                }
                key.map(|key| (key, index, 1))
            }
        };
    }
    if let Some(finished) = current {
        runs.push(finished);
    }
    runs
}

/// Longest run; ties go to the earliest.
fn longest<K: Copy>(runs: &[(K, usize, usize)]) -> Option<(K, usize, usize)> {
    runs.iter()
        .copied()
        .fold(None, |best: Option<(K, usize, usize)>, run| match best {
            Some(best) if best.2 >= run.2 => Some(best),
            _ => Some(run),
        })
}

pub fn analyze_streaks(numbers: &[u8]) -> StreakAnalysis {
    let pockets: Vec<_> = numbers
        .iter()
        .filter_map(|number| WHEEL.get(*number as usize))
        .collect();

    let color_runs = runs(pockets.iter().map(|pocket| match pocket.color {
        Color::Green => None,
        color => Some(color),
    }));
    let parity_runs = runs(pockets.iter().map(|pocket| pocket.parity()));
    let number_runs = runs(pockets.iter().map(|pocket| Some(pocket.number)));

    let mut analysis = StreakAnalysis::default();
    if let Some((color, start, length)) = longest(&color_runs) {
        analysis.longest_color = ColorStreak {
            color: Some(color),
            length,
            start,
        };
    }
    if let Some((parity, start, length)) = longest(&parity_runs) {
        analysis.longest_parity = ParityStreak {
            parity: Some(parity),
            length,
            start,
        };
    }
    if let Some((number, start, length)) = longest(&number_runs) {
        analysis.longest_number = NumberStreak {
            number: Some(number),
            length,
            start,
        };
    }
    analysis.color_streaks_over_5 = color_runs.iter().filter(|run| run.2 > 5).count();
    analysis.color_streaks_over_10 = color_runs.iter().filter(|run| run.2 > 10).count();
    analysis
}

/// How often a number came up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFrequency {
    pub number: u8,
    pub color: Color,
    pub count: usize,
    /// Share of all spins, in percent.
    pub percentage: f64,
}

/// One entry per pocket, 0 through 36.
pub fn number_frequency(numbers: &[u8]) -> Vec<NumberFrequency> {
    let mut counts = [0usize; POCKETS];
    for number in numbers {
        if let Some(count) = counts.get_mut(*number as usize) {
            *count += 1;
        }
    }
    WHEEL
        .iter()
        .zip(counts)
        .map(|(pocket, count)| NumberFrequency {
            number: pocket.number,
            color: pocket.color,
            count,
            percentage: if numbers.is_empty() {
                0.0
            } else {
                count as f64 / numbers.len() as f64 * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run;
    use rosistrat_types::{SimulationConfig, StrategyId};

    #[test]
    fn test_summary_standard_martingale() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale);
        // Lose, lose, win, win
        let run = run(&[2, 4, 1, 3], &config).unwrap();
        let summary = summarize(&run);

        assert_eq!(summary.total_spins, 4);
        assert_eq!(summary.final_earnings, 10.0);
        assert_eq!(summary.final_portfolio, 10_010.0);
        assert_eq!(summary.total_wagered, 5.0 + 10.0 + 20.0 + 5.0);
        assert_eq!(summary.max_bets, vec![LineMaximum { id: "red".to_string(), max_bet: 20.0 }]);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.roi, 10.0 / 40.0);
        assert_eq!(summary.max_win_streak, 2);
        assert_eq!(summary.max_loss_streak, 2);
        assert_eq!(summary.min_portfolio, 9_985.0);
        assert_eq!(summary.max_portfolio, 10_010.0);
        assert_eq!(summary.drawdown.lowest_earnings, -15.0);
        assert!((summary.drawdown.peak_to_trough_pct - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_drawdown_when_always_in_profit() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale);
        // Red every spin: cumulative 5, 10, 15
        let drawdown = max_drawdown(&run(&[1, 3, 5], &config).unwrap());
        assert_eq!(drawdown.lowest_earnings, 5.0);
        assert_eq!(drawdown.peak_to_trough_pct, 0.0);
        assert_eq!(max_drawdown(&run(&[], &config).unwrap()), Drawdown::default());
    }

    #[test]
    fn test_portfolio_range_ignores_starting_bankroll() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale);
        // Black twice: portfolio 9995, then 9985
        let summary = summarize(&run(&[2, 4], &config).unwrap());
        assert_eq!(summary.max_portfolio, 9_995.0);
        assert_eq!(summary.min_portfolio, 9_985.0);

        let summary = summarize(&run(&[1, 3], &config).unwrap());
        assert_eq!(summary.min_portfolio, 10_005.0);
        assert_eq!(summary.max_portfolio, 10_010.0);
    }

    #[test]
    fn test_summary_empty_run() {
        let config = SimulationConfig::new(StrategyId::MaxLose);
        let summary = summarize(&run(&[], &config).unwrap());
        assert_eq!(summary.total_spins, 0);
        assert_eq!(summary.final_portfolio, 10_000.0);
        assert_eq!(summary.portfolio_growth, 0.0);
        assert_eq!(summary.max_portfolio, 10_000.0);
        assert_eq!(summary.min_portfolio, 10_000.0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert_eq!(summary.max_bets.len(), 5);
    }

    #[test]
    fn test_volatility() {
        let config = SimulationConfig::new(StrategyId::StandardMartingale);
        // +5, +5: no spread
        assert_eq!(volatility(&run(&[1, 3], &config).unwrap()), 0.0);
        // -5, +10
        assert_eq!(volatility(&run(&[2, 1], &config).unwrap()), 7.5);
    }

    #[test]
    fn test_analyze_streaks() {
        // red x3, zero, black x2, red
        let analysis = analyze_streaks(&[1, 3, 5, 0, 2, 4, 7]);
        assert_eq!(
            analysis.longest_color,
            ColorStreak { color: Some(Color::Red), length: 3, start: 0 }
        );
        // 1, 3, 5 odd; 2, 4 even
        assert_eq!(analysis.longest_parity.parity, Some(Parity::Odd));
        assert_eq!(analysis.longest_parity.length, 3);
        assert_eq!(analysis.longest_number.length, 1);
        assert_eq!(analysis.color_streaks_over_5, 0);
    }

    #[test]
    fn test_analyze_streaks_counts_long_runs() {
        // Six reds, green, eleven blacks (the final run counts too)
        let mut numbers = vec![1, 3, 5, 7, 9, 12, 0];
        numbers.extend([2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22]);
        let analysis = analyze_streaks(&numbers);
        assert_eq!(analysis.color_streaks_over_5, 2);
        assert_eq!(analysis.color_streaks_over_10, 1);
        assert_eq!(analysis.longest_color.color, Some(Color::Black));
        assert_eq!(analysis.longest_color.length, 11);
        assert_eq!(analysis.longest_color.start, 7);
    }

    #[test]
    fn test_analyze_streaks_repeated_number() {
        let analysis = analyze_streaks(&[17, 17, 17, 4]);
        assert_eq!(
            analysis.longest_number,
            NumberStreak { number: Some(17), length: 3, start: 0 }
        );
        assert_eq!(analyze_streaks(&[]), StreakAnalysis::default());
    }

    #[test]
    fn test_number_frequency() {
        let frequencies = number_frequency(&[0, 17, 17, 36]);
        assert_eq!(frequencies.len(), 37);
        assert_eq!(frequencies[17].count, 2);
        assert_eq!(frequencies[17].percentage, 50.0);
        assert_eq!(frequencies[0].color, Color::Green);
        assert_eq!(frequencies.iter().map(|f| f.count).sum::<usize>(), 4);
        assert!(number_frequency(&[]).iter().all(|f| f.percentage == 0.0));
    }
}
