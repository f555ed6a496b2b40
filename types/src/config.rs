use crate::{
    Bet, BetSpec, BetType, Error, Result, StrategyId, DEFAULT_SEQUENCE_LENGTH,
    DEFAULT_STARTING_BANKROLL,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a line's stake evolves after a loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    /// Always the initial bet.
    Flat,
    /// Double.
    Martingale,
    /// Initial bet times the next Fibonacci number.
    Fibonacci,
    /// Add one initial bet.
    Dalembert,
    /// Next absolute value from the line's custom list.
    Custom,
}

/// One bet line of a multi-line strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub initial_bet: f64,
    pub bet_type: BetType,
    pub target: String,
    pub payout_multiplier: f64,
    #[serde(default = "default_progression")]
    pub progression: Progression,
    #[serde(default)]
    pub custom_progression: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub reset_on_win: bool,
    /// Progression never stakes more than this.
    #[serde(default)]
    pub max_bet: Option<f64>,
}

fn default_progression() -> Progression {
    Progression::Martingale
}

fn default_true() -> bool {
    true
}

impl LineConfig {
    pub fn new(
        id: &str,
        name: &str,
        initial_bet: f64,
        bet_type: BetType,
        target: &str,
        payout_multiplier: f64,
        progression: Progression,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            initial_bet,
            bet_type,
            target: target.to_string(),
            payout_multiplier,
            progression,
            custom_progression: None,
            reset_on_win: true,
            max_bet: None,
        }
    }

    pub fn bet(&self) -> Result<Bet> {
        Bet::parse(self.bet_type, &self.target)
    }

    pub fn spec(&self) -> Result<BetSpec> {
        Ok(BetSpec::new(self.bet()?, self.payout_multiplier))
    }

    /// Custom stakes, or an empty slice for other progressions.
    pub fn custom_steps(&self) -> &[f64] {
        self.custom_progression.as_deref().unwrap_or(&[])
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::config("line id must not be empty"));
        }
        positive(&format!("line {} initialBet", self.id), self.initial_bet)?;
        if !self.payout_multiplier.is_finite() || self.payout_multiplier < 1.0 {
            return Err(Error::config(format!(
                "line {} payoutMultiplier must be at least 1, got {}",
                self.id, self.payout_multiplier
            )));
        }
        self.bet()?;
        if self.progression == Progression::Custom {
            let steps = self.custom_steps();
            if steps.is_empty() {
                return Err(Error::config(format!(
                    "line {} uses a custom progression without steps",
                    self.id
                )));
            }
            for step in steps {
                positive(&format!("line {} custom step", self.id), *step)?;
            }
        }
        if let Some(max_bet) = self.max_bet {
            if !max_bet.is_finite() || max_bet < self.initial_bet {
                return Err(Error::config(format!(
                    "line {} maxBet must be at least the initial bet, got {max_bet}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Streak-amplified outcome generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_variance_amplifier")]
    pub variance_amplifier: f64,
    /// Trailing draws examined for colour/parity runs.
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_variance_amplifier() -> f64 {
    1.2
}

fn default_window() -> usize {
    10
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            variance_amplifier: default_variance_amplifier(),
            window: default_window(),
        }
    }
}

impl StreakConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Everything needed to reproduce a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default = "default_strategy")]
    pub strategy: StrategyId,
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    /// Generator seed; recorded here after an unseeded run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_starting_bankroll")]
    pub starting_bankroll: f64,
    /// Safe Compound: portfolio must cover this many times a stake.
    #[serde(default = "default_safety_ratio")]
    pub safety_ratio: f64,
    /// SAM+: fraction of the Kelly stake actually used.
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
    /// SAM+: safety ratio before volatility adjustment.
    #[serde(default = "default_safety_ratio")]
    pub base_safety_ratio: f64,
    /// SAM+: return volatility above which the strategy turns conservative.
    #[serde(default = "default_volatility_threshold")]
    pub volatility_threshold: f64,
    /// Standard Martingale opening stake.
    #[serde(default = "default_unit_bet")]
    pub base_bet: f64,
    /// Zapping opening stake.
    #[serde(default = "default_unit_bet")]
    pub zapping_bet: f64,
    /// Replaces the strategy's default line set.
    #[serde(default)]
    pub lines: Option<Vec<LineConfig>>,
    #[serde(default)]
    pub streaks: StreakConfig,
}

fn default_strategy() -> StrategyId {
    StrategyId::MaxLose
}

fn default_sequence_length() -> usize {
    DEFAULT_SEQUENCE_LENGTH
}

fn default_starting_bankroll() -> f64 {
    DEFAULT_STARTING_BANKROLL
}

fn default_safety_ratio() -> f64 {
    6.0
}

fn default_kelly_fraction() -> f64 {
    0.5
}

fn default_volatility_threshold() -> f64 {
    0.15
}

fn default_unit_bet() -> f64 {
    5.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            sequence_length: default_sequence_length(),
            seed: None,
            starting_bankroll: default_starting_bankroll(),
            safety_ratio: default_safety_ratio(),
            kelly_fraction: default_kelly_fraction(),
            base_safety_ratio: default_safety_ratio(),
            volatility_threshold: default_volatility_threshold(),
            base_bet: default_unit_bet(),
            zapping_bet: default_unit_bet(),
            lines: None,
            streaks: StreakConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(strategy: StrategyId) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sequence_length(mut self, sequence_length: usize) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    /// The same settings applied to another strategy.
    ///
    /// Line overrides are dropped when the target strategy has a fixed line.
    pub fn for_strategy(&self, strategy: StrategyId) -> Self {
        let mut config = self.clone();
        config.strategy = strategy;
        if !strategy.accepts_lines() {
            config.lines = None;
        }
        config
    }

    /// Lines the configured strategy will play.
    pub fn line_set(&self) -> Vec<LineConfig> {
        match &self.lines {
            Some(lines) if self.strategy.accepts_lines() => lines.clone(),
            _ => self.strategy.default_lines(),
        }
    }

    /// Portfolio value once `earnings` have accumulated.
    pub fn portfolio(&self, earnings: f64) -> f64 {
        self.starting_bankroll + earnings
    }

    /// Rejects values that would break engine invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.starting_bankroll.is_finite() {
            return Err(Error::config("startingBankroll must be finite"));
        }
        positive("safetyRatio", self.safety_ratio)?;
        positive("baseSafetyRatio", self.base_safety_ratio)?;
        positive("baseBet", self.base_bet)?;
        positive("zappingBet", self.zapping_bet)?;
        if !(self.kelly_fraction > 0.0 && self.kelly_fraction <= 1.0) {
            return Err(Error::config(format!(
                "kellyFraction must be in (0, 1], got {}",
                self.kelly_fraction
            )));
        }
        if !self.volatility_threshold.is_finite() || self.volatility_threshold < 0.0 {
            return Err(Error::config(format!(
                "volatilityThreshold must be non-negative, got {}",
                self.volatility_threshold
            )));
        }
        if !self.streaks.variance_amplifier.is_finite() || self.streaks.variance_amplifier < 1.0 {
            return Err(Error::config(format!(
                "streaks.varianceAmplifier must be at least 1, got {}",
                self.streaks.variance_amplifier
            )));
        }
        if self.streaks.window < 2 {
            return Err(Error::config(format!(
                "streaks.window must be at least 2, got {}",
                self.streaks.window
            )));
        }
        if let Some(lines) = &self.lines {
            if !self.strategy.accepts_lines() {
                return Err(Error::config(format!(
                    "{} plays a fixed line and does not accept lines",
                    self.strategy
                )));
            }
            if lines.is_empty() {
                return Err(Error::config("lines must not be empty"));
            }
            let mut seen = HashSet::new();
            for line in lines {
                line.validate()?;
                if !seen.insert(line.id.as_str()) {
                    return Err(Error::config(format!("duplicate line id: {}", line.id)));
                }
            }
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("{field} must be positive, got {value}")))
    }
}
