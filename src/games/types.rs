use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Result of a settled round from the player's side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Push => write!(f, "push"),
        }
    }
}

impl Outcome {
    /// Whether the settlement counts as a win for the lifetime stats
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Settlement produced by a game engine when a round finishes
///
/// Engines never touch the wallet: the caller debits the stake before
/// play and credits `payout` after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    /// Unique round identifier stamped at settlement time
    pub round_id: String,
    pub outcome: Outcome,
    /// Total amount the player staked over the round
    pub bet_amount: u64,
    /// Amount to credit back, zero on a loss
    pub payout: u64,
}

impl Settlement {
    pub fn new(outcome: Outcome, bet_amount: u64, payout: u64) -> Self {
        Self {
            round_id: Uuid::new_v4().to_string(),
            outcome,
            bet_amount,
            payout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_ids_are_unique() {
        let a = Settlement::new(Outcome::Win, 10, 20);
        let b = Settlement::new(Outcome::Win, 10, 20);
        assert_ne!(a.round_id, b.round_id);
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Push).unwrap(), "\"push\"");
        assert!(Outcome::Win.is_win());
        assert!(!Outcome::Push.is_win());
    }
}
