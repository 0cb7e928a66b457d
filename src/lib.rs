//! Parlor - Client-Side Casino Core
//!
//! Wallet and session state with durable single-blob persistence, plus
//! self-contained outcome engines for roulette, blackjack, and heads-up
//! poker. Game engines never touch the wallet: callers debit before play
//! and credit settlements after.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;
pub mod session;
pub mod storage;
pub mod wallet;

pub use config::ParlorConfig;
pub use errors::{ConfigError, GameError, RejectReason, StorageError};
pub use session::UserSession;
pub use wallet::{MutateOptions, Subscription, WalletSnapshot, WalletStore, WalletUpdate};
