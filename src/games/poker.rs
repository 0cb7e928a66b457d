//! Heads-up Texas hold'em against a scripted opponent
//!
//! One player versus a house opponent that plays a fixed-probability
//! policy. The round walks `PreFlop -> Flop -> Turn -> River ->
//! Showdown`; community cards land between betting turns, and the
//! opponent reacts inside each player action. The engine never touches
//! the wallet: the caller debits the opening bet up front, debits
//! `player_spend` from each action report, and credits the settlement
//! payout at the end.

use crate::config::PokerConfig;
use crate::errors::GameError;
use crate::games::cards::{Card, Deck, Suit};
use crate::games::rng::RandomSource;
use crate::games::types::{Outcome, Settlement};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Settled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PreFlop => write!(f, "pre-flop"),
            Stage::Flop => write!(f, "flop"),
            Stage::Turn => write!(f, "turn"),
            Stage::River => write!(f, "river"),
            Stage::Showdown => write!(f, "showdown"),
            Stage::Settled => write!(f, "settled"),
        }
    }
}

/// Hand categories from weakest to strongest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandCategory::HighCard => "high card",
            HandCategory::Pair => "pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfAKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfAKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
        };
        write!(f, "{}", name)
    }
}

/// Evaluated strength: category first, then the category's key rank
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandRank {
    pub category: HandCategory,
    /// Highest rank value relevant to the category (pair rank, straight
    /// high card, and so on)
    pub tiebreak: u8,
}

/// Best rank over hole cards plus community
///
/// The straight-flush check is the coarse one the table uses: a straight
/// and a flush anywhere in the seven cards count together, without
/// requiring the same five cards.
pub fn evaluate_hand(hole: &[Card], community: &[Card]) -> HandRank {
    let cards: Vec<Card> = hole.iter().chain(community.iter()).copied().collect();

    let mut suit_counts: HashMap<Suit, u8> = HashMap::new();
    for card in &cards {
        *suit_counts.entry(card.suit).or_insert(0) += 1;
    }
    let flush_suit = suit_counts
        .iter()
        .find(|(_, count)| **count >= 5)
        .map(|(suit, _)| *suit);
    let flush_high = flush_suit.map(|suit| {
        cards
            .iter()
            .filter(|c| c.suit == suit)
            .map(|c| c.rank.value())
            .max()
            .unwrap_or(0)
    });

    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();
    let straight_high = values
        .windows(5)
        .find(|window| window[0] - window[4] == 4)
        .map(|window| window[0]);

    let mut rank_counts: HashMap<u8, u8> = HashMap::new();
    for card in &cards {
        *rank_counts.entry(card.rank.value()).or_insert(0) += 1;
    }
    let highest_with_count = |count: u8| -> Option<u8> {
        rank_counts
            .iter()
            .filter(|(_, c)| **c == count)
            .map(|(value, _)| *value)
            .max()
    };
    let mut counts: Vec<u8> = rank_counts.values().copied().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let top = counts.first().copied().unwrap_or(0);
    let second = counts.get(1).copied().unwrap_or(0);

    let high_card = values.first().copied().unwrap_or(0);

    if let (Some(straight), Some(_)) = (straight_high, flush_high) {
        return HandRank {
            category: HandCategory::StraightFlush,
            tiebreak: straight,
        };
    }
    if top == 4 {
        return HandRank {
            category: HandCategory::FourOfAKind,
            tiebreak: highest_with_count(4).unwrap_or(high_card),
        };
    }
    if top == 3 && second == 2 {
        return HandRank {
            category: HandCategory::FullHouse,
            tiebreak: highest_with_count(3).unwrap_or(high_card),
        };
    }
    if let Some(high) = flush_high {
        return HandRank {
            category: HandCategory::Flush,
            tiebreak: high,
        };
    }
    if let Some(high) = straight_high {
        return HandRank {
            category: HandCategory::Straight,
            tiebreak: high,
        };
    }
    if top == 3 {
        return HandRank {
            category: HandCategory::ThreeOfAKind,
            tiebreak: highest_with_count(3).unwrap_or(high_card),
        };
    }
    if top == 2 && second == 2 {
        return HandRank {
            category: HandCategory::TwoPair,
            tiebreak: highest_with_count(2).unwrap_or(high_card),
        };
    }
    if top == 2 {
        return HandRank {
            category: HandCategory::Pair,
            tiebreak: highest_with_count(2).unwrap_or(high_card),
        };
    }
    HandRank {
        category: HandCategory::HighCard,
        tiebreak: high_card,
    }
}

/// What the opponent did in response to the player's action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OpponentAction {
    Checked,
    Called(u64),
    Raised(u64),
    Folded,
}

/// Result of one player action
#[derive(Debug, Clone)]
pub struct ActionReport {
    /// Extra tokens the caller must debit for this action
    pub player_spend: u64,
    pub opponent: Option<OpponentAction>,
    pub stage: Stage,
    /// Present once the action ended the round
    pub settlement: Option<Settlement>,
}

/// One heads-up hold'em round
#[derive(Debug, Clone)]
pub struct PokerRound {
    config: PokerConfig,
    deck: Deck,
    player_hole: Vec<Card>,
    opponent_hole: Vec<Card>,
    community: Vec<Card>,
    pot: u64,
    current_bet: u64,
    player_bet: u64,
    opponent_bet: u64,
    stage: Stage,
    settlement: Option<Settlement>,
}

impl PokerRound {
    /// Post the blinds and deal hole cards
    ///
    /// The player's opening bet doubles as their blind and must be at
    /// least the big blind; the opponent posts exactly the big blind.
    /// The caller debits `opening_bet` before calling.
    pub fn open(
        opening_bet: u64,
        config: PokerConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, GameError> {
        if opening_bet < config.big_blind {
            return Err(GameError::InvalidBet(format!(
                "opening bet must be at least the big blind of {}",
                config.big_blind
            )));
        }

        let mut deck = Deck::shuffled(rng);
        let player_hole = vec![deck.draw()?, deck.draw()?];
        let opponent_hole = vec![deck.draw()?, deck.draw()?];

        let pot = opening_bet + config.big_blind;
        let opponent_bet = config.big_blind;
        debug!(opening_bet, pot, "poker round opened");

        Ok(Self {
            config,
            deck,
            player_hole,
            opponent_hole,
            community: Vec::new(),
            pot,
            current_bet: opening_bet,
            player_bet: opening_bet,
            opponent_bet,
            stage: Stage::PreFlop,
            settlement: None,
        })
    }

    /// Pass the action without adding tokens; only legal when no bet is
    /// outstanding
    pub fn check(&mut self, rng: &mut dyn RandomSource) -> Result<ActionReport, GameError> {
        self.ensure_active("check")?;
        if self.current_bet != self.player_bet {
            return Err(GameError::InvalidAction(
                "cannot check while facing a bet".into(),
            ));
        }
        self.resolve_turn(0, rng)
    }

    /// Match the outstanding bet; with nothing to call this is a check
    pub fn call(&mut self, rng: &mut dyn RandomSource) -> Result<ActionReport, GameError> {
        self.ensure_active("call")?;
        let to_call = self.current_bet - self.player_bet;
        if to_call == 0 {
            return self.resolve_turn(0, rng);
        }
        self.player_bet += to_call;
        self.pot += to_call;
        self.resolve_turn(to_call, rng)
    }

    /// Raise by twice the big blind on top of matching any outstanding bet
    pub fn raise(&mut self, rng: &mut dyn RandomSource) -> Result<ActionReport, GameError> {
        self.ensure_active("raise")?;
        let raise_amount = self.config.big_blind * 2;
        let spend = (self.current_bet - self.player_bet) + raise_amount;
        self.player_bet += spend;
        self.current_bet = self.player_bet;
        self.pot += spend;

        if rng.next_unit() < self.config.opponent_call_raise_probability {
            let to_call = self.current_bet - self.opponent_bet;
            self.opponent_bet += to_call;
            self.pot += to_call;
            self.advance_stage()?;
            Ok(self.report(spend, Some(OpponentAction::Called(to_call))))
        } else {
            let settlement = self.settle(Outcome::Win, self.pot);
            Ok(ActionReport {
                player_spend: spend,
                opponent: Some(OpponentAction::Folded),
                stage: self.stage,
                settlement: Some(settlement),
            })
        }
    }

    /// Give up the hand, forfeiting everything staked
    pub fn fold(&mut self) -> Result<ActionReport, GameError> {
        self.ensure_active("fold")?;
        let settlement = self.settle(Outcome::Loss, 0);
        Ok(ActionReport {
            player_spend: 0,
            opponent: None,
            stage: self.stage,
            settlement: Some(settlement),
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    /// Outstanding amount the player must match to continue
    pub fn to_call(&self) -> u64 {
        self.current_bet - self.player_bet
    }

    /// Total the player has staked so far
    pub fn player_bet(&self) -> u64 {
        self.player_bet
    }

    pub fn player_hole(&self) -> &[Card] {
        &self.player_hole
    }

    pub fn opponent_hole(&self) -> &[Card] {
        &self.opponent_hole
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Opponent reaction after the player checked or called, then the
    /// street advances
    ///
    /// An opponent raise does not reopen the betting on the current
    /// street: the street still advances and the player faces the raise
    /// on the next one.
    fn resolve_turn(
        &mut self,
        player_spend: u64,
        rng: &mut dyn RandomSource,
    ) -> Result<ActionReport, GameError> {
        let opponent = if self.current_bet > self.opponent_bet {
            if rng.next_unit() < self.config.opponent_call_probability {
                let to_call = self.current_bet - self.opponent_bet;
                self.opponent_bet += to_call;
                self.pot += to_call;
                OpponentAction::Called(to_call)
            } else {
                let settlement = self.settle(Outcome::Win, self.pot);
                return Ok(ActionReport {
                    player_spend,
                    opponent: Some(OpponentAction::Folded),
                    stage: self.stage,
                    settlement: Some(settlement),
                });
            }
        } else if rng.next_unit() < self.config.opponent_raise_probability {
            let raise_amount = self.config.big_blind;
            self.opponent_bet += raise_amount;
            self.current_bet = self.opponent_bet;
            self.pot += raise_amount;
            OpponentAction::Raised(raise_amount)
        } else {
            OpponentAction::Checked
        };

        self.advance_stage()?;
        Ok(self.report(player_spend, Some(opponent)))
    }

    fn advance_stage(&mut self) -> Result<(), GameError> {
        self.stage = match self.stage {
            Stage::PreFlop => {
                self.community.push(self.deck.draw()?);
                self.community.push(self.deck.draw()?);
                self.community.push(self.deck.draw()?);
                Stage::Flop
            }
            Stage::Flop => {
                self.community.push(self.deck.draw()?);
                Stage::Turn
            }
            Stage::Turn => {
                self.community.push(self.deck.draw()?);
                Stage::River
            }
            Stage::River => {
                self.stage = Stage::Showdown;
                self.showdown();
                return Ok(());
            }
            Stage::Showdown | Stage::Settled => self.stage,
        };
        Ok(())
    }

    fn showdown(&mut self) {
        let player_rank = evaluate_hand(&self.player_hole, &self.community);
        let opponent_rank = evaluate_hand(&self.opponent_hole, &self.community);
        debug!(
            player = %player_rank.category,
            opponent = %opponent_rank.category,
            "showdown"
        );

        if player_rank > opponent_rank {
            self.settle(Outcome::Win, self.pot);
        } else if player_rank < opponent_rank {
            self.settle(Outcome::Loss, 0);
        } else {
            // Split pot, integer floor; an odd token stays with the house.
            self.settle(Outcome::Push, self.pot / 2);
        }
    }

    fn settle(&mut self, outcome: Outcome, payout: u64) -> Settlement {
        let settlement = Settlement::new(outcome, self.player_bet, payout);
        info!(
            round_id = %settlement.round_id,
            outcome = %outcome,
            pot = self.pot,
            payout,
            "poker round settled"
        );
        self.settlement = Some(settlement.clone());
        self.stage = Stage::Settled;
        settlement
    }

    fn report(&self, player_spend: u64, opponent: Option<OpponentAction>) -> ActionReport {
        ActionReport {
            player_spend,
            opponent,
            stage: self.stage,
            settlement: self.settlement.clone(),
        }
    }

    fn ensure_active(&self, action: &'static str) -> Result<(), GameError> {
        if self.stage == Stage::Settled {
            return Err(GameError::OutOfTurn {
                action,
                stage: self.stage.to_string(),
            });
        }
        Ok(())
    }
}
