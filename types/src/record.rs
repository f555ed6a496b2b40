use crate::{BetSpec, SimulationConfig, StrategyId};
use serde::{Deserialize, Serialize};

/// Mutable state of one bet line while a strategy runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineState {
    pub id: String,
    pub spec: BetSpec,
    pub current_bet: f64,
    pub initial_bet: f64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub loss_streak: u32,
    pub is_paused: bool,
}

impl LineState {
    pub fn new(id: impl Into<String>, spec: BetSpec, initial_bet: f64) -> Self {
        Self {
            id: id.into(),
            spec,
            current_bet: initial_bet,
            initial_bet,
            total_wagered: 0.0,
            total_won: 0.0,
            loss_streak: 0,
            is_paused: false,
        }
    }

    /// Winnings minus wagers.
    pub fn net_result(&self) -> f64 {
        self.total_won - self.total_wagered
    }

    /// Books the current stake as placed and returns its profit.
    ///
    /// Progression (next stake, loss streak) is left to the engine.
    pub fn settle(&mut self, won: bool) -> f64 {
        let stake = self.current_bet;
        self.total_wagered += stake;
        if won {
            self.total_won += stake * self.spec.payout_multiplier;
        }
        self.spec.profit(stake, won)
    }

    /// Back to the opening stake with no running loss streak.
    pub fn reset(&mut self) {
        self.current_bet = self.initial_bet;
        self.loss_streak = 0;
    }
}

/// What happened to one line on one spin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOutcome {
    pub id: String,
    /// Amount actually staked, zero when paused.
    pub bet: f64,
    pub won: bool,
    pub paused: bool,
}

impl LineOutcome {
    pub fn placed(id: &str, bet: f64, won: bool) -> Self {
        Self {
            id: id.to_string(),
            bet,
            won,
            paused: false,
        }
    }

    pub fn paused(id: &str) -> Self {
        Self {
            id: id.to_string(),
            bet: 0.0,
            won: false,
            paused: true,
        }
    }
}

/// Risk posture chosen by SAM+ for a spin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveMode {
    Aggressive,
    Balanced,
    Conservative,
}

/// Portfolio analytics SAM+ attaches to each record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalytics {
    pub volatility: f64,
    pub recent_drawdown: f64,
    pub dynamic_safety_ratio: f64,
    pub risk_score: f64,
    pub adaptive_mode: AdaptiveMode,
}

/// One spin of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRecord {
    /// 1-based.
    pub spin: usize,
    pub number: u8,
    pub net_result: f64,
    pub cumulative_earnings: f64,
    /// In the strategy's line order.
    pub lines: Vec<LineOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<PortfolioAnalytics>,
}

impl SpinRecord {
    pub fn total_bet(&self) -> f64 {
        self.lines.iter().map(|line| line.bet).sum()
    }

    pub fn line(&self, id: &str) -> Option<&LineOutcome> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn bet_for(&self, id: &str) -> Option<f64> {
        self.line(id).map(|line| line.bet)
    }

    pub fn paused_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.paused)
            .map(|line| line.id.as_str())
    }

    pub fn is_winning(&self) -> bool {
        self.net_result > 0.0
    }
}

/// A complete (or cancelled) simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub strategy: StrategyId,
    pub config: SimulationConfig,
    pub records: Vec<SpinRecord>,
    /// Stopped early; `records` holds the spins completed before the stop.
    #[serde(default)]
    pub cancelled: bool,
}

impl SimulationRun {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn final_earnings(&self) -> f64 {
        self.records
            .last()
            .map(|record| record.cumulative_earnings)
            .unwrap_or(0.0)
    }

    pub fn final_portfolio(&self) -> f64 {
        self.config.portfolio(self.final_earnings())
    }

    pub fn total_wagered(&self) -> f64 {
        self.records.iter().map(SpinRecord::total_bet).sum()
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.records.iter().map(|record| record.number).collect()
    }

    /// Line ids in column order.
    pub fn line_ids(&self) -> Vec<String> {
        match self.records.first() {
            Some(record) => record.lines.iter().map(|line| line.id.clone()).collect(),
            None => self
                .config
                .line_set()
                .into_iter()
                .map(|line| line.id)
                .collect(),
        }
    }
}
