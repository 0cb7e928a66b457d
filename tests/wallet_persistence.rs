//! Session persistence across wallet store restarts
//!
//! Exercises the read priority order end to end on a real directory:
//! primary file first, legacy cookie jar second, fresh guest last.

use parlor::wallet::WalletStore;
use parlor::ParlorConfig;
use std::fs;

fn config_in(dir: &tempfile::TempDir) -> ParlorConfig {
    ParlorConfig::production(dir.path().to_str().unwrap())
}

#[test]
fn test_session_survives_store_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    // === PHASE 1: mutate a fresh session and drop the store ===
    let (nickname, balance) = {
        let store = WalletStore::new(&config);
        let update = store.credit(250);
        assert!(update.accepted);
        let update = store.rename("Night Owl");
        assert!(update.accepted);

        let snapshot = store.snapshot();
        (snapshot.nickname, snapshot.balance)
    };

    // === PHASE 2: reopen from the same directory ===
    let store = WalletStore::new(&config);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.nickname, nickname);
    assert_eq!(snapshot.nickname, "Night Owl");
    assert_eq!(snapshot.balance, balance);
    assert!(!store.is_degraded());
}

#[test]
fn test_legacy_jar_migrates_to_primary_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let jar = serde_json::json!({
        "theme": "dark",
        "casino_user":
            "{\"nickname\":\"HighRoller\",\"balance\":742.9,\"totalWagered\":1200.0,\"wins\":4,\"losses\":9}",
    });
    fs::write(
        dir.path().join(&config.storage.legacy_file),
        jar.to_string(),
    )
    .unwrap();

    // === PHASE 1: first open reads the jar and writes the primary ===
    {
        let store = WalletStore::new(&config);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.nickname, "HighRoller");
        assert_eq!(snapshot.balance, 742);
        assert_eq!(snapshot.total_wagered, 1200);
        assert_eq!(snapshot.wins, 4);
        assert_eq!(snapshot.losses, 9);

        assert!(dir.path().join(&config.storage.session_file).exists());

        let update = store.credit(58);
        assert!(update.accepted);
    }

    // === PHASE 2: the primary now wins over the untouched jar ===
    let store = WalletStore::new(&config);
    assert_eq!(store.snapshot().balance, 800);
    assert_eq!(store.snapshot().nickname, "HighRoller");
}

#[test]
fn test_corrupt_primary_regenerates_guest_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let primary = dir.path().join(&config.storage.session_file);
    fs::write(&primary, b"{definitely not json").unwrap();

    let store = WalletStore::new(&config);
    assert!(store.recovered());
    let snapshot = store.snapshot();
    assert_eq!(snapshot.balance, config.wallet.starting_balance);
    assert!(snapshot.nickname.starts_with(&config.wallet.guest_prefix));

    // The regenerated session replaced the corrupt blob on disk.
    let raw = fs::read(&primary).unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn test_corrupt_primary_still_falls_back_to_jar() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    fs::write(dir.path().join(&config.storage.session_file), b"garbage").unwrap();
    let jar = serde_json::json!({
        "casino_user": "{\"nickname\":\"Survivor\",\"balance\":64.0}",
    });
    fs::write(
        dir.path().join(&config.storage.legacy_file),
        jar.to_string(),
    )
    .unwrap();

    let store = WalletStore::new(&config);
    assert_eq!(store.snapshot().nickname, "Survivor");
    assert_eq!(store.snapshot().balance, 64);
}

#[test]
fn test_ephemeral_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ParlorConfig::ephemeral();
    config.storage.data_directory = dir.path().to_str().unwrap().to_string();

    let store = WalletStore::new(&config);
    store.credit(100);

    assert!(!dir.path().join(&config.storage.session_file).exists());
}
