//! Error types for the parlor casino core
//!
//! Expected domain failures of wallet operations (bad amounts, short
//! nicknames, not enough tokens) are not errors: they travel as reason
//! codes on the operation result. The enums here cover storage,
//! configuration, and game-flow faults.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason code attached to a rejected wallet operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Amount was zero or otherwise not a positive integer
    InvalidAmount,
    /// Debit larger than the current balance
    InsufficientBalance,
    /// Nickname outside the configured length bounds after trimming
    InvalidLength,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidAmount => write!(f, "invalid-amount"),
            RejectReason::InsufficientBalance => write!(f, "insufficient-balance"),
            RejectReason::InvalidLength => write!(f, "invalid-length"),
        }
    }
}

/// Session persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read session data: {0}")]
    ReadFailed(String),

    #[error("Failed to write session data: {0}")]
    WriteFailed(String),

    #[error("Corrupted session data: {0}")]
    CorruptedData(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::Unavailable(e.to_string()),
            _ => StorageError::ReadFailed(e.to_string()),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Game round errors
///
/// Engines reject out-of-turn operations instead of panicking, so a page
/// driving a round cannot corrupt it by double-clicking.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Action '{action}' not allowed in stage '{stage}'")]
    OutOfTurn { action: &'static str, stage: String },

    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Deck exhausted")]
    DeckExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_serializes_kebab_case() {
        let json = serde_json::to_string(&RejectReason::InsufficientBalance).unwrap();
        assert_eq!(json, "\"insufficient-balance\"");
        assert_eq!(RejectReason::InvalidAmount.to_string(), "invalid-amount");
    }

    #[test]
    fn test_game_error_display() {
        let err = GameError::OutOfTurn {
            action: "hit",
            stage: "settled".to_string(),
        };
        assert!(err.to_string().contains("hit"));
        assert!(err.to_string().contains("settled"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let storage: StorageError = io.into();
        assert!(matches!(storage, StorageError::Unavailable(_)));
    }
}
