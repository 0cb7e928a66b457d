//! Session persistence backends
//!
//! The durable state is one JSON session blob under a fixed filename.
//! Three backends cover the read priority order: the primary file store,
//! a read-only legacy cookie-jar mirror kept for profiles written by the
//! previous release, and an in-memory store for tests and degraded mode.

use crate::errors::StorageError;
use crate::session::UserSession;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Cookie name the previous release stored the profile under
const LEGACY_COOKIE_NAME: &str = "casino_user";

/// Pluggable session persistence
pub trait SessionStore: Send + Sync {
    /// Read the stored session, `None` when nothing has been written yet
    fn load(&self) -> Result<Option<UserSession>, StorageError>;

    /// Replace the stored session with the given record
    fn save(&self, session: &UserSession) -> Result<(), StorageError>;
}

/// Primary backend: one pretty-printed JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(directory: &Path, filename: &str) -> Self {
        Self {
            path: directory.join(filename),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<UserSession>, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: UserSession = serde_json::from_slice(&raw).map_err(|e| {
            StorageError::CorruptedData(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(Some(session))
    }

    fn save(&self, session: &UserSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let bytes = serde_json::to_vec_pretty(session)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        std::fs::write(&self.path, bytes)
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

/// Profile record as the previous release wrote it: camelCase fields and a
/// float balance. Converted on load, floored to whole tokens.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    #[serde(default = "legacy_default_nickname")]
    nickname: String,
    balance: f64,
    #[serde(default)]
    total_wagered: f64,
    #[serde(default)]
    wins: u64,
    #[serde(default)]
    losses: u64,
}

fn legacy_default_nickname() -> String {
    "Guest User".to_string()
}

impl From<LegacyRecord> for UserSession {
    fn from(record: LegacyRecord) -> Self {
        let now = chrono::Utc::now();
        Self {
            nickname: record.nickname,
            balance: record.balance.max(0.0) as u64,
            total_wagered: record.total_wagered.max(0.0) as u64,
            wins: record.wins,
            losses: record.losses,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Read-only fallback over the legacy cookie jar
///
/// The jar is a JSON object mapping cookie names to string values; the
/// profile lives JSON-encoded inside its cookie value. A successful load
/// is migrated to the primary store, which is the sole writer afterwards.
pub struct LegacyCookieStore {
    path: PathBuf,
}

impl LegacyCookieStore {
    pub fn new(directory: &Path, filename: &str) -> Self {
        Self {
            path: directory.join(filename),
        }
    }
}

impl SessionStore for LegacyCookieStore {
    fn load(&self) -> Result<Option<UserSession>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let jar: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            StorageError::CorruptedData(format!("{}: {}", self.path.display(), e))
        })?;

        let Some(value) = jar.get(LEGACY_COOKIE_NAME) else {
            return Ok(None);
        };

        let record: LegacyRecord = serde_json::from_str(value).map_err(|e| {
            StorageError::CorruptedData(format!("cookie '{}': {}", LEGACY_COOKIE_NAME, e))
        })?;

        Ok(Some(record.into()))
    }

    fn save(&self, _session: &UserSession) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed(
            "legacy cookie jar is read-only".to_string(),
        ))
    }
}

/// Volatile backend for tests and storage-degraded operation
#[derive(Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<UserSession>, StorageError> {
        let slot = self
            .slot
            .read()
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, session: &UserSession) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        *slot = Some(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletConfig;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "session.json");

        assert!(store.load().unwrap().is_none());

        let session = UserSession::fresh(&WalletConfig::default());
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().expect("session should be present");
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileSessionStore::new(dir.path(), "session.json");
        let err = store.load().unwrap_err();
        assert!(matches!(err, StorageError::CorruptedData(_)));
    }

    #[test]
    fn test_legacy_jar_parses_camel_case_floats() {
        let dir = tempfile::tempdir().unwrap();
        let jar = serde_json::json!({
            "theme": "dark",
            "casino_user":
                "{\"nickname\":\"HighRoller\",\"balance\":742.9,\"totalWagered\":1500.0,\"wins\":3,\"losses\":5}",
        });
        std::fs::write(dir.path().join("cookie_jar.json"), jar.to_string()).unwrap();

        let store = LegacyCookieStore::new(dir.path(), "cookie_jar.json");
        let session = store.load().unwrap().expect("cookie should be present");

        assert_eq!(session.nickname, "HighRoller");
        assert_eq!(session.balance, 742);
        assert_eq!(session.total_wagered, 1500);
        assert_eq!(session.wins, 3);
        assert_eq!(session.losses, 5);
    }

    #[test]
    fn test_legacy_jar_without_profile_cookie() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cookie_jar.json"), "{\"theme\":\"dark\"}").unwrap();

        let store = LegacyCookieStore::new(dir.path(), "cookie_jar.json");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_legacy_jar_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LegacyCookieStore::new(dir.path(), "cookie_jar.json");
        let session = UserSession::fresh(&WalletConfig::default());
        assert!(store.save(&session).is_err());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let session = UserSession::fresh(&WalletConfig::default());
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), session);
    }
}
