//! Page-facing facade over the global wallet store
//!
//! The thin surface every page wires its buttons to. Each function
//! delegates to the process-wide [`WalletStore`]; pages that need their
//! own store instance use [`crate::wallet::WalletStore`] directly.

use crate::wallet::{self, MutateOptions, Subscription, WalletSnapshot, WalletUpdate};

/// Read-only snapshot of the current user
pub fn get_user_snapshot() -> WalletSnapshot {
    wallet::global().snapshot()
}

/// Update the display nickname; pass `MutateOptions::silent()` to skip
/// listener fan-out while the user is still typing
pub fn set_nickname(name: &str, options: MutateOptions) -> WalletUpdate {
    wallet::global().rename_with(name, options)
}

/// Add tokens to the balance
pub fn add_tokens(amount: u64, options: MutateOptions) -> WalletUpdate {
    wallet::global().credit_with(amount, options)
}

/// Spend tokens from the balance
pub fn spend_tokens(amount: u64, options: MutateOptions) -> WalletUpdate {
    wallet::global().debit_with(amount, options)
}

/// Subscribe to wallet changes; the handle deregisters on drop
pub fn on_change(listener: impl Fn(&WalletSnapshot) + Send + Sync + 'static) -> Subscription {
    wallet::global().subscribe(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParlorConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Single test so the shared global store is exercised sequentially.
    #[test]
    fn test_facade_round_trip() {
        wallet::init_global(&ParlorConfig::ephemeral());

        let start = get_user_snapshot().balance;

        let update = add_tokens(40, MutateOptions::default());
        assert!(update.accepted);
        assert_eq!(update.snapshot.balance, start + 40);

        let update = spend_tokens(15, MutateOptions::default());
        assert!(update.accepted);
        assert_eq!(update.snapshot.balance, start + 25);

        let update = set_nickname("  Facade Fan  ", MutateOptions::default());
        assert!(update.accepted);
        assert_eq!(get_user_snapshot().nickname, "Facade Fan");

        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        let sub = on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        add_tokens(5, MutateOptions::default());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        add_tokens(5, MutateOptions::silent());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        add_tokens(5, MutateOptions::default());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }
}
