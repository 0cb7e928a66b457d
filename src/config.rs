//! Configuration management with validation and defaults
//!
//! Centralized configuration for the wallet, the storage layer, and the
//! game tables. Values mirror the classic browser casino: 1000 starting
//! tokens, 3-20 character nicknames, 2x/15x/35x roulette payouts.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration with per-section defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParlorConfig {
    pub wallet: WalletConfig,
    pub storage: StorageConfig,
    pub games: GamesConfig,
}

impl Default for ParlorConfig {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            storage: StorageConfig::default(),
            games: GamesConfig::default(),
        }
    }
}

/// Wallet and session configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Balance granted to a freshly generated session
    pub starting_balance: u64,
    pub nickname_min_len: usize,
    pub nickname_max_len: usize,
    /// Prefix for generated guest nicknames ("Guest" -> "Guest-4821")
    pub guest_prefix: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            nickname_min_len: 3,
            nickname_max_len: 20,
            guest_prefix: "Guest".to_string(),
        }
    }
}

/// Session persistence configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: String,
    /// Primary session blob, JSON under a fixed filename
    pub session_file: String,
    /// Read-only legacy mirror consulted when the primary is absent
    pub legacy_file: String,
    /// When false the store never touches disk (testing / kiosk mode)
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./data".to_string(),
            session_file: "session.json".to_string(),
            legacy_file: "cookie_jar.json".to_string(),
            persist: true,
        }
    }
}

/// Game table configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GamesConfig {
    pub roulette: RouletteConfig,
    pub blackjack: BlackjackConfig,
    pub poker: PokerConfig,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            roulette: RouletteConfig::default(),
            blackjack: BlackjackConfig::default(),
            poker: PokerConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouletteConfig {
    /// Multiplier for a matched red/black selection
    pub color_multiplier: u64,
    /// Multiplier for a green selection landing on zero
    pub green_multiplier: u64,
    /// Multiplier for a matched straight number selection
    pub straight_multiplier: u64,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            color_multiplier: 2,
            green_multiplier: 15,
            straight_multiplier: 35,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlackjackConfig {
    /// Dealer draws while below this total
    pub dealer_stand_threshold: u8,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            dealer_stand_threshold: 17,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PokerConfig {
    /// Opening bet floor; also the opponent's posted blind
    pub big_blind: u64,
    /// Probability the opponent calls when facing a bet
    pub opponent_call_probability: f64,
    /// Probability the opponent raises one big blind when bets are level
    pub opponent_raise_probability: f64,
    /// Probability the opponent calls a player raise
    pub opponent_call_raise_probability: f64,
}

impl Default for PokerConfig {
    fn default() -> Self {
        Self {
            big_blind: 20,
            opponent_call_probability: 0.6,
            opponent_raise_probability: 0.3,
            opponent_call_raise_probability: 0.7,
        }
    }
}

/// Configuration validation and factory methods
impl ParlorConfig {
    /// Create configuration that never touches disk, for tests and demos
    pub fn ephemeral() -> Self {
        Self {
            storage: StorageConfig {
                persist: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create configuration for a deployed kiosk with a dedicated data dir
    pub fn production(data_directory: &str) -> Self {
        Self {
            storage: StorageConfig {
                data_directory: data_directory.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| ConfigError::SaveFailed(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wallet.nickname_min_len == 0 {
            return Err(ConfigError::InvalidValue(
                "nickname_min_len must be > 0".to_string(),
            ));
        }

        if self.wallet.nickname_min_len > self.wallet.nickname_max_len {
            return Err(ConfigError::InvalidValue(
                "nickname_min_len must be <= nickname_max_len".to_string(),
            ));
        }

        let roulette = &self.games.roulette;
        if roulette.color_multiplier < 1
            || roulette.green_multiplier < 1
            || roulette.straight_multiplier < 1
        {
            return Err(ConfigError::InvalidValue(
                "roulette multipliers must be >= 1".to_string(),
            ));
        }

        let threshold = self.games.blackjack.dealer_stand_threshold;
        if !(2..=21).contains(&threshold) {
            return Err(ConfigError::InvalidValue(
                "dealer_stand_threshold must be within 2..=21".to_string(),
            ));
        }

        let poker = &self.games.poker;
        if poker.big_blind == 0 {
            return Err(ConfigError::InvalidValue(
                "big_blind must be > 0".to_string(),
            ));
        }

        for (name, p) in [
            ("opponent_call_probability", poker.opponent_call_probability),
            (
                "opponent_raise_probability",
                poker.opponent_raise_probability,
            ),
            (
                "opponent_call_raise_probability",
                poker.opponent_call_raise_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be within [0, 1]",
                    name
                )));
            }
        }

        Ok(())
    }
}
