//! Outcome draws for a single play session
//!
//! Two independent uniform draws decide the result: win or lose, then
//! jackpot or standard prize for winners.

mod outcome;

pub use outcome::{
    Odds, Outcome, OutcomeGenerator, PrizeTable, JACKPOT_AMOUNT, JACKPOT_CHANCE_PROMO,
    JACKPOT_CHANCE_STANDARD, STANDARD_PRIZE_MAX, STANDARD_PRIZE_MIN, WIN_CHANCE_PROMO,
    WIN_CHANCE_STANDARD,
};
