//! Wallet store: the single mutable session record behind every page
//!
//! All mutations run the same pipeline: validate, mutate under the write
//! lock, persist the full blob, then fan out the fresh snapshot to
//! registered listeners. Expected failures come back as reason codes on
//! the update, never as panics.

use crate::config::{ParlorConfig, WalletConfig};
use crate::errors::RejectReason;
use crate::session::{self, UserSession};
use crate::storage::{FileSessionStore, LegacyCookieStore, MemorySessionStore, SessionStore};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Callback invoked with the latest snapshot after each mutation
pub type Listener = Box<dyn Fn(&WalletSnapshot) + Send + Sync>;

/// Read-only view of the session handed to pages and listeners
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub nickname: String,
    pub balance: u64,
    pub total_wagered: u64,
    pub wins: u64,
    pub losses: u64,
}

impl From<&UserSession> for WalletSnapshot {
    fn from(session: &UserSession) -> Self {
        Self {
            nickname: session.nickname.clone(),
            balance: session.balance,
            total_wagered: session.total_wagered,
            wins: session.wins,
            losses: session.losses,
        }
    }
}

/// Per-mutation options
///
/// Silent mutations persist but skip listener fan-out; the profile page
/// uses this while the user is still typing.
#[derive(Clone, Copy, Debug, Default)]
pub struct MutateOptions {
    pub silent: bool,
}

impl MutateOptions {
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// Result of a wallet mutation
#[derive(Clone, Debug, Serialize)]
pub struct WalletUpdate {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub snapshot: WalletSnapshot,
}

impl WalletUpdate {
    fn applied(snapshot: WalletSnapshot) -> Self {
        Self {
            accepted: true,
            reason: None,
            snapshot,
        }
    }

    fn rejected(reason: RejectReason, snapshot: WalletSnapshot) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
            snapshot,
        }
    }
}

/// The wallet store
pub struct WalletStore {
    config: WalletConfig,
    session: RwLock<UserSession>,
    backend: Box<dyn SessionStore>,
    /// Set once the backend rejects a write; the store then runs
    /// in-memory for the life of the process
    degraded: AtomicBool,
    /// Whether the initial load discarded a corrupt or out-of-bounds record
    recovered: bool,
    listeners: Arc<DashMap<u64, Listener>>,
    listener_seq: Arc<AtomicU64>,
}

impl WalletStore {
    /// Open the store with the configured backend and read priority:
    /// primary file, then legacy cookie jar, then a fresh guest session.
    pub fn new(config: &ParlorConfig) -> Self {
        if !config.storage.persist {
            let session = UserSession::fresh(&config.wallet);
            return Self::assemble(
                config.wallet.clone(),
                session,
                Box::new(MemorySessionStore::new()),
            );
        }

        let dir = Path::new(&config.storage.data_directory);
        let primary = FileSessionStore::new(dir, &config.storage.session_file);
        let legacy = LegacyCookieStore::new(dir, &config.storage.legacy_file);

        let (session, needs_write, recovered) =
            Self::load_prioritized(&primary, &legacy, &config.wallet);
        let mut store = Self::assemble(config.wallet.clone(), session, Box::new(primary));
        store.recovered = recovered;

        // Migrated and freshly generated sessions are written through
        // immediately so the primary becomes the single writer.
        if needs_write {
            let session = store.session.read().unwrap().clone();
            store.persist(&session);
        }

        store
    }

    /// Open the store over an explicit backend
    pub fn with_backend(config: WalletConfig, backend: Box<dyn SessionStore>) -> Self {
        let mut recovered = false;
        let session = match backend.load() {
            Ok(Some(session)) if session.is_valid(&config) => session,
            Ok(Some(_)) => {
                warn!("stored session out of bounds, regenerating");
                recovered = true;
                UserSession::fresh(&config)
            }
            Ok(None) => UserSession::fresh(&config),
            Err(e) => {
                warn!(error = %e, "unable to read stored session, regenerating");
                recovered = true;
                UserSession::fresh(&config)
            }
        };

        let mut store = Self::assemble(config, session, backend);
        store.recovered = recovered;
        let session = store.session.read().unwrap().clone();
        store.persist(&session);
        store
    }

    fn assemble(
        config: WalletConfig,
        session: UserSession,
        backend: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            session: RwLock::new(session),
            backend,
            degraded: AtomicBool::new(false),
            recovered: false,
            listeners: Arc::new(DashMap::new()),
            listener_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn load_prioritized(
        primary: &FileSessionStore,
        legacy: &LegacyCookieStore,
        config: &WalletConfig,
    ) -> (UserSession, bool, bool) {
        let mut recovered = false;
        match primary.load() {
            Ok(Some(session)) if session.is_valid(config) => {
                info!(nickname = %session.nickname, "restored session from primary store");
                return (session, false, false);
            }
            Ok(Some(_)) => {
                warn!("stored session out of bounds, discarding");
                recovered = true;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "discarding unreadable session blob");
                recovered = true;
            }
        }

        match legacy.load() {
            Ok(Some(session)) if session.is_valid(config) => {
                info!(nickname = %session.nickname, "migrating session from legacy cookie jar");
                return (session, true, recovered);
            }
            Ok(Some(_)) => warn!("legacy session out of bounds, ignoring"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "unable to read legacy cookie jar"),
        }

        info!("generating fresh guest session");
        (UserSession::fresh(config), true, recovered)
    }

    /// Current read-only view of the session
    pub fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot::from(&*self.session.read().unwrap())
    }

    /// Whether the store has fallen back to in-memory operation
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Whether a corrupt stored record was discarded on load
    pub fn recovered(&self) -> bool {
        self.recovered
    }

    /// Add tokens to the balance
    pub fn credit(&self, amount: u64) -> WalletUpdate {
        self.credit_with(amount, MutateOptions::default())
    }

    pub fn credit_with(&self, amount: u64, options: MutateOptions) -> WalletUpdate {
        let update = self.apply(options, |session| {
            if amount == 0 {
                return Err(RejectReason::InvalidAmount);
            }
            session.balance = session.balance.saturating_add(amount);
            Ok(())
        });

        if update.accepted {
            info!(amount, balance = update.snapshot.balance, "credit applied");
        }
        update
    }

    /// Remove tokens from the balance; never drives it below zero
    pub fn debit(&self, amount: u64) -> WalletUpdate {
        self.debit_with(amount, MutateOptions::default())
    }

    pub fn debit_with(&self, amount: u64, options: MutateOptions) -> WalletUpdate {
        let update = self.apply(options, |session| {
            if amount == 0 {
                return Err(RejectReason::InvalidAmount);
            }
            if session.balance < amount {
                return Err(RejectReason::InsufficientBalance);
            }
            session.balance -= amount;
            Ok(())
        });

        if update.accepted {
            info!(amount, balance = update.snapshot.balance, "debit applied");
        }
        update
    }

    /// Change the display nickname
    pub fn rename(&self, new_nickname: &str) -> WalletUpdate {
        self.rename_with(new_nickname, MutateOptions::default())
    }

    pub fn rename_with(&self, new_nickname: &str, options: MutateOptions) -> WalletUpdate {
        let trimmed = session::normalize_nickname(new_nickname);
        if !session::nickname_in_bounds(trimmed, &self.config) {
            return WalletUpdate::rejected(RejectReason::InvalidLength, self.snapshot());
        }

        let update = self.apply(options, |session| {
            session.nickname = trimmed.to_string();
            Ok(())
        });

        if update.accepted {
            info!(nickname = %update.snapshot.nickname, "nickname updated");
        }
        update
    }

    /// Lifetime wager bookkeeping, applied when a bet is staked
    pub fn record_wager(&self, amount: u64) -> WalletUpdate {
        self.apply(MutateOptions::default(), |session| {
            session.total_wagered = session.total_wagered.saturating_add(amount);
            Ok(())
        })
    }

    /// Win/loss counters, applied when a round settles
    pub fn record_outcome(&self, won: bool) -> WalletUpdate {
        self.apply(MutateOptions::default(), |session| {
            if won {
                session.wins += 1;
            } else {
                session.losses += 1;
            }
            Ok(())
        })
    }

    /// Register a listener; dropped or unsubscribed handles deregister
    pub fn subscribe(
        &self,
        listener: impl Fn(&WalletSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.listener_seq.fetch_add(1, Ordering::SeqCst);
        self.listeners.insert(id, Box::new(listener));
        debug!(id, "listener registered");
        Subscription {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }

    fn apply(
        &self,
        options: MutateOptions,
        mutate: impl FnOnce(&mut UserSession) -> Result<(), RejectReason>,
    ) -> WalletUpdate {
        let outcome = {
            let mut session = self.session.write().unwrap();
            match mutate(&mut session) {
                Ok(()) => {
                    session.updated_at = chrono::Utc::now();
                    self.persist(&session);
                    Ok(WalletSnapshot::from(&*session))
                }
                Err(reason) => Err((reason, WalletSnapshot::from(&*session))),
            }
        };

        match outcome {
            Ok(snapshot) => {
                if options.silent {
                    debug!("silent mutation, skipping listener fan-out");
                } else {
                    self.fan_out(&snapshot);
                }
                WalletUpdate::applied(snapshot)
            }
            Err((reason, snapshot)) => {
                debug!(%reason, "mutation rejected");
                WalletUpdate::rejected(reason, snapshot)
            }
        }
    }

    fn persist(&self, session: &UserSession) {
        if self.degraded.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = self.backend.save(session) {
            warn!(error = %e, "session storage failed, continuing in-memory");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }

    fn fan_out(&self, snapshot: &WalletSnapshot) {
        debug!(listeners = self.listeners.len(), "notifying listeners");
        for entry in self.listeners.iter() {
            (entry.value())(snapshot);
        }
    }
}

/// Handle returned by [`WalletStore::subscribe`]
pub struct Subscription {
    id: u64,
    listeners: Arc<DashMap<u64, Listener>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Explicit deregistration; dropping the handle does the same
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listeners.remove(&self.id);
        debug!(id = self.id, "listener removed");
    }
}

/// Process-wide store used by the page-facing facade
static GLOBAL_WALLET: OnceCell<WalletStore> = OnceCell::new();

/// Install the process-wide store with an explicit configuration.
/// The first caller wins; later calls return the existing instance.
pub fn init_global(config: &ParlorConfig) -> &'static WalletStore {
    GLOBAL_WALLET.get_or_init(|| WalletStore::new(config))
}

/// The module-scoped store instance shared by every page
pub fn global() -> &'static WalletStore {
    GLOBAL_WALLET.get_or_init(|| WalletStore::new(&ParlorConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use std::sync::atomic::AtomicUsize;

    fn memory_store() -> WalletStore {
        WalletStore::with_backend(
            WalletConfig::default(),
            Box::new(MemorySessionStore::new()),
        )
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn load(&self) -> Result<Option<UserSession>, StorageError> {
            Ok(None)
        }

        fn save(&self, _session: &UserSession) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed("disk full".to_string()))
        }
    }

    #[test]
    fn test_credit_increases_balance_and_notifies_once() {
        let store = memory_store();
        let notifications = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&notifications);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let update = store.credit(250);
        assert!(update.accepted);
        assert_eq!(update.snapshot.balance, 1250);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_credit_zero_rejected() {
        let store = memory_store();
        let update = store.credit(0);
        assert!(!update.accepted);
        assert_eq!(update.reason, Some(RejectReason::InvalidAmount));
        assert_eq!(store.snapshot().balance, 1000);
    }

    #[test]
    fn test_debit_insufficient_balance_leaves_state_unchanged() {
        let store = memory_store();
        let update = store.debit(5000);
        assert!(!update.accepted);
        assert_eq!(update.reason, Some(RejectReason::InsufficientBalance));
        assert_eq!(store.snapshot().balance, 1000);
    }

    #[test]
    fn test_debit_success() {
        let store = memory_store();
        let update = store.debit(400);
        assert!(update.accepted);
        assert_eq!(update.snapshot.balance, 600);
    }

    #[test]
    fn test_rename_trims_and_applies() {
        let store = memory_store();
        let update = store.rename("  HighRoller  ");
        assert!(update.accepted);
        assert_eq!(store.snapshot().nickname, "HighRoller");
    }

    #[test]
    fn test_rename_rejects_out_of_bounds() {
        let store = memory_store();
        let before = store.snapshot().nickname;

        let update = store.rename("ab");
        assert!(!update.accepted);
        assert_eq!(update.reason, Some(RejectReason::InvalidLength));
        assert_eq!(store.snapshot().nickname, before);

        let update = store.rename(&"x".repeat(25));
        assert!(!update.accepted);
    }

    #[test]
    fn test_silent_mutation_skips_fan_out() {
        let store = memory_store();
        let notifications = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&notifications);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let update = store.rename_with("QuietType", MutateOptions::silent());
        assert!(update.accepted);
        assert_eq!(store.snapshot().nickname, "QuietType");
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rejected_mutation_does_not_notify() {
        let store = memory_store();
        let notifications = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&notifications);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _ = store.debit(0);
        let _ = store.debit(10_000);
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = memory_store();
        let notifications = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&notifications);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.credit(10);
        sub.unsubscribe();
        store.credit(10);

        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_receives_latest_snapshot() {
        let store = memory_store();
        let seen = Arc::new(RwLock::new(None));

        let slot = Arc::clone(&seen);
        let _sub = store.subscribe(move |snapshot| {
            *slot.write().unwrap() = Some(snapshot.clone());
        });

        store.credit(123);
        let snapshot = seen.read().unwrap().clone().expect("listener should fire");
        assert_eq!(snapshot.balance, 1123);
    }

    #[test]
    fn test_stats_bookkeeping() {
        let store = memory_store();
        store.record_wager(50);
        store.record_wager(25);
        store.record_outcome(true);
        store.record_outcome(false);
        store.record_outcome(false);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_wagered, 75);
        assert_eq!(snapshot.wins, 1);
        assert_eq!(snapshot.losses, 2);
    }

    #[test]
    fn test_corrupt_backend_record_sets_recovered() {
        struct CorruptStore;

        impl SessionStore for CorruptStore {
            fn load(&self) -> Result<Option<UserSession>, StorageError> {
                Err(StorageError::CorruptedData("bad blob".to_string()))
            }

            fn save(&self, _session: &UserSession) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let store = WalletStore::with_backend(WalletConfig::default(), Box::new(CorruptStore));
        assert!(store.recovered());
        assert_eq!(store.snapshot().balance, 1000);

        let clean = memory_store();
        assert!(!clean.recovered());
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let store = WalletStore::with_backend(WalletConfig::default(), Box::new(FailingStore));
        assert!(store.is_degraded());

        // Mutations keep working against the in-memory session.
        let update = store.credit(100);
        assert!(update.accepted);
        assert_eq!(store.snapshot().balance, 1100);
    }
}
