//! Nullable eligibility oracle: a registry the test controls.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use ubi_types::{Address, EligibilityOracle};

/// An in-memory eligibility registry.
///
/// Clones share the same registry, so a test can keep a handle and flip
/// eligibility while the ledger holds another.
#[derive(Clone, Default)]
pub struct NullOracle {
    eligible: Arc<Mutex<HashSet<Address>>>,
}

impl NullOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle that already considers `accounts` eligible.
    pub fn with_eligible<'a>(accounts: impl IntoIterator<Item = &'a Address>) -> Self {
        let oracle = Self::new();
        for account in accounts {
            oracle.register(account);
        }
        oracle
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Address>> {
        self.eligible.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark `account` eligible.
    pub fn register(&self, account: &Address) {
        self.lock().insert(account.clone());
    }

    /// Mark `account` ineligible.
    pub fn revoke(&self, account: &Address) {
        self.lock().remove(account);
    }

    /// Number of currently eligible accounts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EligibilityOracle for NullOracle {
    fn is_eligible(&self, account: &Address) -> bool {
        self.lock().contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_registry() {
        let oracle = NullOracle::new();
        let handle = oracle.clone();
        let alice = Address::new("ubi_alice");
        assert!(!oracle.is_eligible(&alice));
        handle.register(&alice);
        assert!(oracle.is_eligible(&alice));
        handle.revoke(&alice);
        assert!(oracle.is_empty());
    }
}
