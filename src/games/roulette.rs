//! European roulette wheel and bet settlement
//!
//! A single-zero wheel with 37 pockets. The table holds the payout
//! multipliers from [`RouletteConfig`] and settles one bet per spin;
//! the caller debits the stake first and credits the returned payout.

use crate::config::RouletteConfig;
use crate::errors::GameError;
use crate::games::rng::RandomSource;
use crate::games::types::{Outcome, Settlement};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Pockets on a single-zero wheel, zero included
pub const POCKET_COUNT: u32 = 37;

/// Red pockets on the European layout
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

/// Color of a pocket; zero is the single green pocket
pub fn color_of(number: u8) -> Color {
    if number == 0 {
        Color::Green
    } else if RED_NUMBERS.contains(&number) {
        Color::Red
    } else {
        Color::Black
    }
}

/// What the player put their tokens on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "kind", content = "target")]
pub enum RouletteSelection {
    /// Even-money color bet; green only wins as a straight bet on zero
    Color(Color),
    /// Single number, zero allowed
    Straight(u8),
}

impl fmt::Display for RouletteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouletteSelection::Color(color) => write!(f, "{}", color),
            RouletteSelection::Straight(number) => write!(f, "straight {}", number),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteBet {
    pub amount: u64,
    pub selection: RouletteSelection,
}

impl RouletteBet {
    pub fn color(amount: u64, color: Color) -> Self {
        Self {
            amount,
            selection: RouletteSelection::Color(color),
        }
    }

    pub fn straight(amount: u64, number: u8) -> Self {
        Self {
            amount,
            selection: RouletteSelection::Straight(number),
        }
    }
}

/// Outcome of a single spin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinResult {
    pub number: u8,
    pub color: Color,
    /// Multiplier applied to the stake, zero on a losing bet
    pub multiplier: u64,
    pub settlement: Settlement,
}

/// Settles roulette bets with the configured payout table
#[derive(Debug, Clone)]
pub struct RouletteTable {
    config: RouletteConfig,
}

impl RouletteTable {
    pub fn new(config: RouletteConfig) -> Self {
        Self { config }
    }

    /// Spin the wheel and settle the bet
    ///
    /// The stake must already be debited; a winning result carries the
    /// full payout (stake times multiplier) to credit back.
    pub fn spin(
        &self,
        bet: &RouletteBet,
        rng: &mut dyn RandomSource,
    ) -> Result<SpinResult, GameError> {
        if bet.amount == 0 {
            return Err(GameError::InvalidBet("bet amount must be positive".into()));
        }
        if let RouletteSelection::Straight(number) = bet.selection {
            if number > 36 {
                return Err(GameError::InvalidBet(format!(
                    "straight bet on {} is outside the wheel",
                    number
                )));
            }
        }

        let number = rng.next_below(POCKET_COUNT) as u8;
        let color = color_of(number);
        let multiplier = self.multiplier_for(&bet.selection, number, color);
        let payout = bet.amount * multiplier;
        let outcome = if payout > 0 { Outcome::Win } else { Outcome::Loss };
        let settlement = Settlement::new(outcome, bet.amount, payout);

        info!(
            round_id = %settlement.round_id,
            number,
            color = %color,
            selection = %bet.selection,
            payout,
            "roulette spin settled"
        );

        Ok(SpinResult {
            number,
            color,
            multiplier,
            settlement,
        })
    }

    fn multiplier_for(&self, selection: &RouletteSelection, number: u8, color: Color) -> u64 {
        match selection {
            RouletteSelection::Color(Color::Green) => {
                if color == Color::Green {
                    self.config.green_multiplier
                } else {
                    0
                }
            }
            RouletteSelection::Color(picked) => {
                if color == *picked {
                    self.config.color_multiplier
                } else {
                    0
                }
            }
            RouletteSelection::Straight(picked) => {
                if number == *picked {
                    self.config.straight_multiplier
                } else {
                    0
                }
            }
        }
    }
}

impl Default for RouletteTable {
    fn default() -> Self {
        Self::new(RouletteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rng::ScriptedRandom;

    #[test]
    fn test_color_map_matches_layout() {
        assert_eq!(color_of(0), Color::Green);
        assert_eq!(color_of(1), Color::Red);
        assert_eq!(color_of(2), Color::Black);
        assert_eq!(color_of(19), Color::Red);
        assert_eq!(color_of(28), Color::Black);
        assert_eq!(color_of(36), Color::Red);

        let reds = (1..=36).filter(|n| color_of(*n) == Color::Red).count();
        assert_eq!(reds, 18);
    }

    #[test]
    fn test_winning_color_bet_pays_double() {
        let table = RouletteTable::default();
        // Pocket 1 is red.
        let mut rng = ScriptedRandom::with_draws([1]);
        let result = table
            .spin(&RouletteBet::color(50, Color::Red), &mut rng)
            .unwrap();
        assert_eq!(result.number, 1);
        assert_eq!(result.multiplier, 2);
        assert_eq!(result.settlement.payout, 100);
        assert_eq!(result.settlement.outcome, Outcome::Win);
    }

    #[test]
    fn test_green_bet_pays_fifteen_on_zero() {
        let table = RouletteTable::default();
        let mut rng = ScriptedRandom::with_draws([0]);
        let result = table
            .spin(&RouletteBet::color(10, Color::Green), &mut rng)
            .unwrap();
        assert_eq!(result.number, 0);
        assert_eq!(result.color, Color::Green);
        assert_eq!(result.settlement.payout, 150);
    }

    #[test]
    fn test_straight_bet_pays_thirty_five() {
        let table = RouletteTable::default();
        let mut rng = ScriptedRandom::with_draws([17]);
        let result = table
            .spin(&RouletteBet::straight(4, 17), &mut rng)
            .unwrap();
        assert_eq!(result.multiplier, 35);
        assert_eq!(result.settlement.payout, 140);
    }

    #[test]
    fn test_losing_bet_pays_nothing() {
        let table = RouletteTable::default();
        // Pocket 2 is black.
        let mut rng = ScriptedRandom::with_draws([2]);
        let result = table
            .spin(&RouletteBet::color(25, Color::Red), &mut rng)
            .unwrap();
        assert_eq!(result.multiplier, 0);
        assert_eq!(result.settlement.payout, 0);
        assert_eq!(result.settlement.outcome, Outcome::Loss);
    }

    #[test]
    fn test_rejects_invalid_bets() {
        let table = RouletteTable::default();
        let mut rng = ScriptedRandom::with_draws([5]);
        assert!(matches!(
            table.spin(&RouletteBet::color(0, Color::Red), &mut rng),
            Err(GameError::InvalidBet(_))
        ));
        assert!(matches!(
            table.spin(&RouletteBet::straight(10, 37), &mut rng),
            Err(GameError::InvalidBet(_))
        ));
    }

    #[test]
    fn test_green_color_bet_loses_on_red() {
        let table = RouletteTable::default();
        let mut rng = ScriptedRandom::with_draws([1]);
        let result = table
            .spin(&RouletteBet::color(10, Color::Green), &mut rng)
            .unwrap();
        assert_eq!(result.settlement.payout, 0);
    }
}
