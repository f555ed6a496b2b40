//! Shared types for the roulette strategy simulator.
//!
//! Everything in this crate is plain data: the European wheel, bet descriptions,
//! strategy configuration and the per-spin records produced by the engines in
//! `rosistrat-execution`.

mod bet;
mod config;
mod constants;
mod error;
mod record;
mod strategy;
mod wheel;

pub use bet::*;
pub use config::*;
pub use constants::*;
pub use error::{Error, Result};
pub use record::*;
pub use strategy::*;
pub use wheel::*;
