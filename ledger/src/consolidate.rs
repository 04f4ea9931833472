//! Consolidation: realize pending accrual into principal.

use tracing::debug;
use ubi_types::{Address, Timestamp};

use crate::error::LedgerError;
use crate::ledger::UbiLedger;

/// A checked consolidation of one account, computed before any mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Consolidation {
    pub account: Address,
    pub principal_before: u128,
    pub principal_after: u128,
    /// Accrual being realized.
    pub accrued: u128,
    /// Stream accrual being netted out.
    pub owed: u128,
}

impl UbiLedger {
    /// Work out what consolidating `account` at `now` would store.
    pub(crate) fn plan_consolidation(
        &self,
        account: &Address,
        now: Timestamp,
    ) -> Result<Consolidation, LedgerError> {
        let resolved = self.resolve(account, now)?;
        Ok(Consolidation {
            account: account.clone(),
            principal_before: resolved.principal,
            principal_after: resolved.balance,
            accrued: resolved.accrued,
            owed: resolved.owed,
        })
    }

    /// Total supply after applying `plans` (on distinct accounts) and then
    /// minting `minted` and burning `burned`.
    pub(crate) fn supply_after(
        &self,
        plans: &[&Consolidation],
        minted: u128,
        burned: u128,
    ) -> Result<u128, LedgerError> {
        let overflow = || LedgerError::Overflow("total supply".to_string());
        let mut supply = self.book.total_supply();
        for plan in plans {
            supply = supply
                .checked_sub(plan.principal_before)
                .and_then(|s| s.checked_add(plan.principal_after))
                .ok_or_else(overflow)?;
        }
        supply
            .checked_add(minted)
            .and_then(|s| s.checked_sub(burned))
            .ok_or_else(overflow)
    }

    /// Store the planned principal, net the account's streams, and restart
    /// its clock at `now`. Applying twice at the same instant is a no-op.
    pub(crate) fn apply_consolidation(
        &mut self,
        plan: &Consolidation,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.book.rebase(&plan.account, plan.principal_after)?;
        self.streams.settle_debits(&plan.account, now);
        self.accrual.reset_clock(&plan.account, now);
        debug!(
            account = %plan.account,
            before = %plan.principal_before,
            after = %plan.principal_after,
            accrued = %plan.accrued,
            owed = %plan.owed,
            at = now.as_secs(),
            "consolidated"
        );
        Ok(())
    }
}
