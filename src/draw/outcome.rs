//! Outcome record and the generator that produces it

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Win chance of the standard game screen
pub const WIN_CHANCE_STANDARD: f64 = 0.3;
/// Win chance of the promotional game screen
pub const WIN_CHANCE_PROMO: f64 = 0.5;
/// Jackpot chance (among winners) of the standard game screen
pub const JACKPOT_CHANCE_STANDARD: f64 = 0.1;
/// Jackpot chance (among winners) of the promotional game screen
pub const JACKPOT_CHANCE_PROMO: f64 = 0.15;

/// The single fixed jackpot prize, in euro
pub const JACKPOT_AMOUNT: u64 = 100_000;
/// Lowest standard prize, in euro
pub const STANDARD_PRIZE_MIN: u64 = 5_000;
/// Highest standard prize, in euro
pub const STANDARD_PRIZE_MAX: u64 = 9_999;

/// Result of one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub is_winner: bool,
    /// Prize in euro, always 0 for a loss
    pub amount: u64,
}

impl Outcome {
    pub fn loss() -> Self {
        Self {
            is_winner: false,
            amount: 0,
        }
    }

    pub fn win(amount: u64) -> Self {
        Self {
            is_winner: true,
            amount,
        }
    }
}

/// Win and jackpot probabilities, both within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Odds {
    win: f64,
    jackpot: f64,
}

impl Odds {
    /// Returns `None` unless both probabilities are finite and in [0, 1]
    pub fn new(win: f64, jackpot: f64) -> Option<Self> {
        let valid = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if valid(win) && valid(jackpot) {
            Some(Self { win, jackpot })
        } else {
            None
        }
    }

    pub fn standard() -> Self {
        Self {
            win: WIN_CHANCE_STANDARD,
            jackpot: JACKPOT_CHANCE_STANDARD,
        }
    }

    pub fn promo() -> Self {
        Self {
            win: WIN_CHANCE_PROMO,
            jackpot: JACKPOT_CHANCE_PROMO,
        }
    }

    pub fn win(&self) -> f64 {
        self.win
    }

    pub fn jackpot(&self) -> f64 {
        self.jackpot
    }
}

impl Default for Odds {
    fn default() -> Self {
        Self::standard()
    }
}

/// Prize amounts paid out by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeTable {
    jackpot: u64,
    standard_min: u64,
    standard_max: u64,
}

impl PrizeTable {
    /// Returns `None` when the standard range is empty
    #[cfg(test)]
    pub fn new(jackpot: u64, standard_min: u64, standard_max: u64) -> Option<Self> {
        (standard_min <= standard_max).then_some(Self {
            jackpot,
            standard_min,
            standard_max,
        })
    }

    pub fn standard_range(&self) -> std::ops::RangeInclusive<u64> {
        self.standard_min..=self.standard_max
    }
}

impl Default for PrizeTable {
    fn default() -> Self {
        Self {
            jackpot: JACKPOT_AMOUNT,
            standard_min: STANDARD_PRIZE_MIN,
            standard_max: STANDARD_PRIZE_MAX,
        }
    }
}

/// Cosmetic random draw; no seed control or audit trail in production use
pub struct OutcomeGenerator {
    odds: Odds,
    prizes: PrizeTable,
    rng: StdRng,
}

impl OutcomeGenerator {
    pub fn new(odds: Odds, prizes: PrizeTable) -> Self {
        Self {
            odds,
            prizes,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests
    #[cfg(test)]
    pub fn seeded(odds: Odds, prizes: PrizeTable, seed: u64) -> Self {
        Self {
            odds,
            prizes,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one outcome
    pub fn draw(&mut self) -> Outcome {
        if !self.rng.gen_bool(self.odds.win) {
            debug!("draw: no win");
            return Outcome::loss();
        }

        let jackpot = self.rng.gen_bool(self.odds.jackpot);
        let amount = if jackpot {
            self.prizes.jackpot
        } else {
            self.rng.gen_range(self.prizes.standard_range())
        };

        debug!(jackpot, amount, "draw: win");
        Outcome::win(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWS: usize = 2_000;

    #[test]
    fn test_odds_reject_out_of_range() {
        assert!(Odds::new(1.2, 0.1).is_none());
        assert!(Odds::new(0.3, -0.1).is_none());
        assert!(Odds::new(f64::NAN, 0.1).is_none());
        assert_eq!(Odds::new(0.3, 0.1), Some(Odds::standard()));
    }

    #[test]
    fn test_prize_table_rejects_empty_range() {
        assert!(PrizeTable::new(100_000, 10, 9).is_none());
        assert!(PrizeTable::new(100_000, 10, 10).is_some());
    }

    #[test]
    fn test_never_win() {
        let odds = Odds::new(0.0, 1.0).unwrap();
        let mut generator = OutcomeGenerator::seeded(odds, PrizeTable::default(), 7);

        for _ in 0..DRAWS {
            assert_eq!(generator.draw(), Outcome::loss());
        }
    }

    #[test]
    fn test_always_jackpot() {
        let odds = Odds::new(1.0, 1.0).unwrap();
        let mut generator = OutcomeGenerator::seeded(odds, PrizeTable::default(), 7);

        for _ in 0..DRAWS {
            assert_eq!(generator.draw(), Outcome::win(JACKPOT_AMOUNT));
        }
    }

    #[test]
    fn test_standard_wins_stay_in_range() {
        let odds = Odds::new(1.0, 0.0).unwrap();
        let mut generator = OutcomeGenerator::seeded(odds, PrizeTable::default(), 11);

        for _ in 0..DRAWS {
            let outcome = generator.draw();
            assert!(outcome.is_winner);
            assert!((STANDARD_PRIZE_MIN..=STANDARD_PRIZE_MAX).contains(&outcome.amount));
        }
    }

    #[test]
    fn test_losses_pay_nothing() {
        let mut generator = OutcomeGenerator::seeded(Odds::promo(), PrizeTable::default(), 3);

        for _ in 0..DRAWS {
            let outcome = generator.draw();
            if !outcome.is_winner {
                assert_eq!(outcome.amount, 0);
            } else {
                assert!(
                    outcome.amount == JACKPOT_AMOUNT
                        || (STANDARD_PRIZE_MIN..=STANDARD_PRIZE_MAX).contains(&outcome.amount)
                );
            }
        }
    }

    #[test]
    fn test_custom_prize_table() {
        let odds = Odds::new(1.0, 0.0).unwrap();
        let prizes = PrizeTable::new(1, 42, 42).unwrap();
        let mut generator = OutcomeGenerator::seeded(odds, prizes, 1);

        assert_eq!(generator.draw(), Outcome::win(42));
    }
}
