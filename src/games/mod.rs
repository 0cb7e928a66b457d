pub mod blackjack;
pub mod cards;
pub mod poker;
pub mod rng;
pub mod roulette;
pub mod types;

pub use blackjack::BlackjackRound;
pub use cards::{Card, Deck, Rank, Suit};
pub use poker::PokerRound;
pub use rng::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use roulette::RouletteTable;
pub use types::{Outcome, Settlement};
