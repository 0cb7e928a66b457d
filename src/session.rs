//! User session record and nickname handling.

use crate::config::WalletConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Persistent per-profile session state
///
/// One record per profile, created on first load and never destroyed.
/// The whole struct is serialized as the primary storage blob.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSession {
    pub nickname: String,
    pub balance: u64,
    pub total_wagered: u64,
    pub wins: u64,
    pub losses: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    /// Generate a fresh guest session with the configured starting balance
    pub fn fresh(config: &WalletConfig) -> Self {
        let now = Utc::now();
        Self {
            nickname: generate_guest_nickname(&config.guest_prefix),
            balance: config.starting_balance,
            total_wagered: 0,
            wins: 0,
            losses: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check a loaded record against the configured nickname bounds
    ///
    /// Out-of-range records are treated as corrupt and regenerated rather
    /// than repaired.
    pub fn is_valid(&self, config: &WalletConfig) -> bool {
        nickname_in_bounds(&self.nickname, config)
    }
}

/// Trim surrounding whitespace from a raw nickname
pub fn normalize_nickname(raw: &str) -> &str {
    raw.trim()
}

/// Length check on an already-normalized nickname
pub fn nickname_in_bounds(nickname: &str, config: &WalletConfig) -> bool {
    let len = nickname.chars().count();
    len >= config.nickname_min_len && len <= config.nickname_max_len
}

/// Random guest nickname, e.g. "Guest-4821"
fn generate_guest_nickname(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("{}-{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_defaults() {
        let config = WalletConfig::default();
        let session = UserSession::fresh(&config);

        assert_eq!(session.balance, 1000);
        assert_eq!(session.total_wagered, 0);
        assert_eq!(session.wins, 0);
        assert_eq!(session.losses, 0);
        assert!(session.nickname.starts_with("Guest-"));
        assert!(session.is_valid(&config));
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_nickname("  HighRoller  "), "HighRoller");
        assert_eq!(normalize_nickname("\tAce\n"), "Ace");
    }

    #[test]
    fn test_nickname_bounds() {
        let config = WalletConfig::default();
        assert!(nickname_in_bounds("Ace", &config));
        assert!(nickname_in_bounds("a".repeat(20).as_str(), &config));
        assert!(!nickname_in_bounds("ab", &config));
        assert!(!nickname_in_bounds("a".repeat(21).as_str(), &config));
    }

    #[test]
    fn test_out_of_bounds_record_is_invalid() {
        let config = WalletConfig::default();
        let mut session = UserSession::fresh(&config);
        session.nickname = "x".to_string();
        assert!(!session.is_valid(&config));
    }
}
