//! The eligibility oracle: an external collaborator.

use crate::address::Address;

/// Answers "is this identity currently eligible to accrue".
///
/// Consulted on every evaluation and never cached by the ledger beyond the
/// operation in progress. Implementations live outside this workspace; tests
/// use `ubi_nullables::NullOracle`.
pub trait EligibilityOracle {
    fn is_eligible(&self, account: &Address) -> bool;
}

impl<F> EligibilityOracle for F
where
    F: Fn(&Address) -> bool,
{
    fn is_eligible(&self, account: &Address) -> bool {
        self(account)
    }
}
