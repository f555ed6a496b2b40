use crate::{BetType, Error, LineConfig, Progression};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The six betting systems the simulator can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    CompoundMartingale,
    MaxLose,
    Zapping,
    SafeCompoundMartingale,
    SamPlus,
    StandardMartingale,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::CompoundMartingale,
        StrategyId::MaxLose,
        StrategyId::Zapping,
        StrategyId::SafeCompoundMartingale,
        StrategyId::SamPlus,
        StrategyId::StandardMartingale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompoundMartingale => "compound_martingale",
            Self::MaxLose => "max_lose",
            Self::Zapping => "zapping",
            Self::SafeCompoundMartingale => "safe_compound_martingale",
            Self::SamPlus => "sam_plus",
            Self::StandardMartingale => "standard_martingale",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompoundMartingale => "Compound Martingale",
            Self::MaxLose => "Max Lose",
            Self::Zapping => "Zapping",
            Self::SafeCompoundMartingale => "Safe Compound Martingale",
            Self::SamPlus => "SAM+",
            Self::StandardMartingale => "Standard Martingale",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CompoundMartingale => {
                "Five parallel lines (zero, two dozens, black, even), each with its own progression"
            }
            Self::MaxLose => {
                "Red, black, odd, even and zero; doubles on loss and restarts after five straight losses"
            }
            Self::Zapping => "One colour bet that doubles and switches colour after every loss",
            Self::SafeCompoundMartingale => {
                "Compound Martingale that pauses any line the portfolio cannot cover by the safety ratio"
            }
            Self::SamPlus => {
                "Kelly-capped progressions with volatility-driven safety and Markov colour switching"
            }
            Self::StandardMartingale => "Red only; doubles after every loss and resets on a win",
        }
    }

    /// Whether the strategy's bet lines can be replaced through configuration.
    pub fn accepts_lines(&self) -> bool {
        !matches!(self, Self::Zapping | Self::StandardMartingale)
    }

    /// Default line set used when a configuration does not override it.
    pub fn default_lines(&self) -> Vec<LineConfig> {
        match self {
            Self::CompoundMartingale | Self::SafeCompoundMartingale | Self::SamPlus => {
                compound_lines()
            }
            Self::MaxLose => max_lose_lines(),
            Self::Zapping => vec![LineConfig::new(
                "zapping",
                "Zapping",
                5.0,
                BetType::Color,
                "red",
                2.0,
                Progression::Martingale,
            )],
            Self::StandardMartingale => vec![LineConfig::new(
                "red",
                "Red",
                5.0,
                BetType::Color,
                "red",
                2.0,
                Progression::Martingale,
            )],
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| Error::InvalidConfiguration(format!("unknown strategy: {value}")))
    }
}

/// Zero, first dozen, second dozen, black and even.
pub fn compound_lines() -> Vec<LineConfig> {
    let mut zero = LineConfig::new(
        "zero",
        "Zero",
        1.0,
        BetType::Single,
        "0",
        36.0,
        Progression::Custom,
    );
    zero.custom_progression = Some((1..=10).map(f64::from).collect());
    vec![
        zero,
        LineConfig::new(
            "first_dozen",
            "1st Dozen",
            12.0,
            BetType::Dozen,
            "1-12",
            3.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "second_dozen",
            "2nd Dozen",
            12.0,
            BetType::Dozen,
            "13-24",
            3.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "black",
            "Black",
            18.0,
            BetType::Color,
            "black",
            2.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "even",
            "Even",
            18.0,
            BetType::EvenOdd,
            "even",
            2.0,
            Progression::Martingale,
        ),
    ]
}

/// Red, black, odd, even and zero.
pub fn max_lose_lines() -> Vec<LineConfig> {
    vec![
        LineConfig::new(
            "red",
            "Red",
            18.0,
            BetType::Color,
            "red",
            2.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "black",
            "Black",
            18.0,
            BetType::Color,
            "black",
            2.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "odd",
            "Odd",
            18.0,
            BetType::EvenOdd,
            "odd",
            2.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "even",
            "Even",
            18.0,
            BetType::EvenOdd,
            "even",
            2.0,
            Progression::Martingale,
        ),
        LineConfig::new(
            "zero",
            "Zero",
            1.0,
            BetType::Single,
            "0",
            36.0,
            Progression::Dalembert,
        ),
    ]
}
