//! Blackjack round against the house dealer
//!
//! One player hand versus the dealer, played from a freshly shuffled
//! 52-card deck. The round walks `Betting -> Playing -> DealerTurn ->
//! Settled`; the dealer turn runs to completion inside `stand`, so
//! callers only ever observe the other three stages.

use crate::config::BlackjackConfig;
use crate::errors::GameError;
use crate::games::cards::{Card, Deck, Rank};
use crate::games::rng::RandomSource;
use crate::games::types::{Outcome, Settlement};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Target total; exceeding it busts the hand
pub const BLACKJACK: u8 = 21;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Betting,
    Playing,
    DealerTurn,
    Settled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Betting => write!(f, "betting"),
            Stage::Playing => write!(f, "playing"),
            Stage::DealerTurn => write!(f, "dealer-turn"),
            Stage::Settled => write!(f, "settled"),
        }
    }
}

fn card_value(rank: Rank) -> u8 {
    match rank {
        Rank::Ace => 11,
        Rank::Jack | Rank::Queen | Rank::King => 10,
        other => other.value(),
    }
}

/// Best total for a hand, reducing aces from 11 to 1 while the hand busts
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut total = 0u8;
    let mut soft_aces = 0u8;
    for card in cards {
        total += card_value(card.rank);
        if card.rank == Rank::Ace {
            soft_aces += 1;
        }
    }
    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

/// One blackjack round over a single deck
#[derive(Debug, Clone)]
pub struct BlackjackRound {
    config: BlackjackConfig,
    bet_amount: u64,
    deck: Deck,
    player: Vec<Card>,
    dealer: Vec<Card>,
    stage: Stage,
    settlement: Option<Settlement>,
}

impl BlackjackRound {
    /// Open a round for the given stake; cards are dealt by [`deal`](Self::deal)
    pub fn new(bet_amount: u64, config: BlackjackConfig) -> Result<Self, GameError> {
        if bet_amount == 0 {
            return Err(GameError::InvalidBet("bet amount must be positive".into()));
        }
        Ok(Self {
            config,
            bet_amount,
            deck: Deck::standard(),
            player: Vec::new(),
            dealer: Vec::new(),
            stage: Stage::Betting,
            settlement: None,
        })
    }

    /// Shuffle and deal two cards each, player first
    ///
    /// A dealt total of exactly 21 stands automatically and the round
    /// settles before this returns.
    pub fn deal(&mut self, rng: &mut dyn RandomSource) -> Result<(), GameError> {
        if self.stage != Stage::Betting {
            return Err(self.out_of_turn("deal"));
        }
        self.deck.shuffle(rng);
        self.player.push(self.deck.draw()?);
        self.dealer.push(self.deck.draw()?);
        self.player.push(self.deck.draw()?);
        self.dealer.push(self.deck.draw()?);
        self.stage = Stage::Playing;
        if self.player_total() == BLACKJACK {
            self.run_dealer_turn()?;
        }
        Ok(())
    }

    /// Draw one more card for the player
    ///
    /// Busting settles the round as a loss; reaching exactly 21 stands
    /// automatically.
    pub fn hit(&mut self) -> Result<Card, GameError> {
        if self.stage != Stage::Playing {
            return Err(self.out_of_turn("hit"));
        }
        let card = self.deck.draw()?;
        self.player.push(card);
        let total = self.player_total();
        if total > BLACKJACK {
            self.settle(Outcome::Loss);
        } else if total == BLACKJACK {
            self.run_dealer_turn()?;
        }
        Ok(card)
    }

    /// End the player's turn and let the dealer play out
    pub fn stand(&mut self) -> Result<(), GameError> {
        if self.stage != Stage::Playing {
            return Err(self.out_of_turn("stand"));
        }
        self.run_dealer_turn()
    }

    /// Whether the opening hand is a splittable pair
    ///
    /// True for any two cards of equal blackjack value, so K/Q counts
    /// the same as a natural pair. Split play itself is not offered;
    /// this only drives the option display.
    pub fn can_split(&self) -> bool {
        self.stage == Stage::Playing
            && self.player.len() == 2
            && card_value(self.player[0].rank) == card_value(self.player[1].rank)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn bet_amount(&self) -> u64 {
        self.bet_amount
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer
    }

    pub fn player_total(&self) -> u8 {
        hand_value(&self.player)
    }

    pub fn dealer_total(&self) -> u8 {
        hand_value(&self.dealer)
    }

    /// Settlement once the round has finished
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    fn run_dealer_turn(&mut self) -> Result<(), GameError> {
        self.stage = Stage::DealerTurn;
        while self.dealer_total() < self.config.dealer_stand_threshold {
            let card = self.deck.draw()?;
            self.dealer.push(card);
        }
        let player = self.player_total();
        let dealer = self.dealer_total();
        let outcome = if dealer > BLACKJACK || player > dealer {
            Outcome::Win
        } else if player < dealer {
            Outcome::Loss
        } else {
            Outcome::Push
        };
        self.settle(outcome);
        Ok(())
    }

    fn settle(&mut self, outcome: Outcome) {
        let payout = match outcome {
            Outcome::Win => self.bet_amount * 2,
            Outcome::Push => self.bet_amount,
            Outcome::Loss => 0,
        };
        let settlement = Settlement::new(outcome, self.bet_amount, payout);
        info!(
            round_id = %settlement.round_id,
            player = self.player_total(),
            dealer = self.dealer_total(),
            outcome = %outcome,
            payout,
            "blackjack round settled"
        );
        self.settlement = Some(settlement);
        self.stage = Stage::Settled;
    }

    fn out_of_turn(&self, action: &'static str) -> GameError {
        GameError::OutOfTurn {
            action,
            stage: self.stage.to_string(),
        }
    }
}
