use crate::{Error, Result, MAX_NUMBER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Red numbers on a European wheel.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Pocket colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Black,
}

impl Color {
    /// Red and black swap; green has no opposite.
    pub fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
            Self::Green => Self::Green,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parity of a non-zero pocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Even => "even",
            Self::Odd => "odd",
        }
    }
}

/// Low (1-18) or high (19-36) half of the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    Low,
    High,
}

impl Half {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

/// Static attributes of a wheel pocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pocket {
    pub number: u8,
    pub color: Color,
    /// False for zero, which has no parity.
    pub is_even: bool,
    /// 1-3, absent for zero.
    pub dozen: Option<u8>,
    /// 1-3, absent for zero.
    pub column: Option<u8>,
}

impl Pocket {
    pub fn is_zero(&self) -> bool {
        self.number == 0
    }

    pub fn parity(&self) -> Option<Parity> {
        match (self.is_zero(), self.is_even) {
            (true, _) => None,
            (false, true) => Some(Parity::Even),
            (false, false) => Some(Parity::Odd),
        }
    }

    pub fn half(&self) -> Option<Half> {
        match self.number {
            0 => None,
            1..=18 => Some(Half::Low),
            _ => Some(Half::High),
        }
    }
}

const fn is_red(number: u8) -> bool {
    let mut i = 0;
    while i < RED_NUMBERS.len() {
        if RED_NUMBERS[i] == number {
            return true;
        }
        i += 1;
    }
    false
}

const fn build_wheel() -> [Pocket; 37] {
    let mut wheel = [Pocket {
        number: 0,
        color: Color::Green,
        is_even: false,
        dozen: None,
        column: None,
    }; 37];
    let mut number = 1u8;
    while number <= MAX_NUMBER {
        wheel[number as usize] = Pocket {
            number,
            color: if is_red(number) {
                Color::Red
            } else {
                Color::Black
            },
            is_even: number % 2 == 0,
            dozen: Some((number - 1) / 12 + 1),
            column: Some((number - 1) % 3 + 1),
        };
        number += 1;
    }
    wheel
}

/// The 37 pockets indexed by number.
pub static WHEEL: [Pocket; 37] = build_wheel();

/// Looks up a pocket, rejecting anything off the wheel.
pub fn pocket(number: u8) -> Result<&'static Pocket> {
    WHEEL
        .get(number as usize)
        .ok_or(Error::InvalidNumber(number))
}

/// Numbers whose pocket satisfies `predicate`, in ascending order.
pub fn numbers_where(predicate: impl Fn(&Pocket) -> bool) -> Vec<u8> {
    WHEEL
        .iter()
        .filter(|pocket| predicate(pocket))
        .map(|pocket| pocket.number)
        .collect()
}
