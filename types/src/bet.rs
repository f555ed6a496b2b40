use crate::{Color, Error, Half, Parity, Pocket, Result, MAX_NUMBER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bet families understood by the engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Single,
    Dozen,
    Color,
    EvenOdd,
    HighLow,
    Column,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Dozen => "dozen",
            Self::Color => "color",
            Self::EvenOdd => "even_odd",
            Self::HighLow => "high_low",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bet type bound to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Bet {
    /// Straight-up number, 0-36.
    Single(u8),
    /// Dozen 1-3 ("1-12", "13-24", "25-36").
    Dozen(u8),
    /// Red or black.
    Color(Color),
    EvenOdd(Parity),
    HighLow(Half),
    /// Column 1-3.
    Column(u8),
}

impl Bet {
    /// Builds a bet from its type and textual target (as written in line configuration).
    pub fn parse(bet_type: BetType, target: &str) -> Result<Self> {
        let target = target.trim();
        let invalid = || {
            Error::config(format!(
                "invalid target {target:?} for {bet_type} bet"
            ))
        };
        let bet = match bet_type {
            BetType::Single => Self::Single(target.parse().map_err(|_| invalid())?),
            BetType::Dozen => match target {
                "1-12" => Self::Dozen(1),
                "13-24" => Self::Dozen(2),
                "25-36" => Self::Dozen(3),
                _ => return Err(invalid()),
            },
            BetType::Color => match target.to_ascii_lowercase().as_str() {
                "red" => Self::Color(Color::Red),
                "black" => Self::Color(Color::Black),
                _ => return Err(invalid()),
            },
            BetType::EvenOdd => match target.to_ascii_lowercase().as_str() {
                "even" => Self::EvenOdd(Parity::Even),
                "odd" => Self::EvenOdd(Parity::Odd),
                _ => return Err(invalid()),
            },
            BetType::HighLow => match target.to_ascii_lowercase().as_str() {
                "high" => Self::HighLow(Half::High),
                "low" => Self::HighLow(Half::Low),
                _ => return Err(invalid()),
            },
            BetType::Column => Self::Column(target.parse().map_err(|_| invalid())?),
        };
        bet.validate()?;
        Ok(bet)
    }

    /// Rejects targets that can never be placed on the layout.
    pub fn validate(&self) -> Result<()> {
        let valid = match *self {
            Self::Single(number) => number <= MAX_NUMBER,
            Self::Dozen(dozen) => (1..=3).contains(&dozen),
            Self::Column(column) => (1..=3).contains(&column),
            Self::Color(color) => color != Color::Green,
            Self::EvenOdd(_) | Self::HighLow(_) => true,
        };
        if valid {
            Ok(())
        } else {
            Err(Error::config(format!(
                "invalid target {:?} for {} bet",
                self.target(),
                self.bet_type()
            )))
        }
    }

    pub fn bet_type(&self) -> BetType {
        match self {
            Self::Single(_) => BetType::Single,
            Self::Dozen(_) => BetType::Dozen,
            Self::Color(_) => BetType::Color,
            Self::EvenOdd(_) => BetType::EvenOdd,
            Self::HighLow(_) => BetType::HighLow,
            Self::Column(_) => BetType::Column,
        }
    }

    /// Textual target, the inverse of [`Bet::parse`].
    pub fn target(&self) -> String {
        match *self {
            Self::Single(number) => number.to_string(),
            Self::Dozen(1) => "1-12".to_string(),
            Self::Dozen(2) => "13-24".to_string(),
            Self::Dozen(3) => "25-36".to_string(),
            Self::Dozen(other) => other.to_string(),
            Self::Color(color) => color.as_str().to_string(),
            Self::EvenOdd(parity) => parity.as_str().to_string(),
            Self::HighLow(half) => half.as_str().to_string(),
            Self::Column(column) => column.to_string(),
        }
    }

    /// True if this bet wins when the ball lands in `pocket`.
    ///
    /// Zero loses every outside bet; only `Single(0)` collects on it.
    pub fn wins(&self, pocket: &Pocket) -> bool {
        match *self {
            Self::Single(number) => pocket.number == number,
            Self::Dozen(dozen) => pocket.dozen == Some(dozen),
            Self::Color(color) => pocket.color == color,
            Self::EvenOdd(parity) => pocket.parity() == Some(parity),
            Self::HighLow(half) => pocket.half() == Some(half),
            Self::Column(column) => pocket.column == Some(column),
        }
    }

    /// Total return multiplier paid on a European table (stake included).
    pub fn table_multiplier(&self) -> f64 {
        match self {
            Self::Single(_) => 36.0,
            Self::Dozen(_) | Self::Column(_) => 3.0,
            Self::Color(_) | Self::EvenOdd(_) | Self::HighLow(_) => 2.0,
        }
    }
}

/// Decides a bet against a pocket.
pub fn resolve(pocket: &Pocket, bet: &Bet) -> bool {
    bet.wins(pocket)
}

/// A bet together with the multiplier its line is paid at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSpec {
    pub bet: Bet,
    /// Total return on a win, stake included.
    pub payout_multiplier: f64,
}

impl BetSpec {
    pub fn new(bet: Bet, payout_multiplier: f64) -> Self {
        Self {
            bet,
            payout_multiplier,
        }
    }

    /// Profit on `stake`: `stake * (m - 1)` on a win, `-stake` otherwise.
    pub fn profit(&self, stake: f64, won: bool) -> f64 {
        if won {
            stake * (self.payout_multiplier - 1.0)
        } else {
            -stake
        }
    }
}
