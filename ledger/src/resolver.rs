//! Balance resolution: the public read path.
//!
//! Nothing here mutates. The same arithmetic backs consolidation, so a
//! balance read and the principal a consolidation would store agree
//! exactly.

use ubi_accrual::FactorSplit;
use ubi_types::{Address, Timestamp};

use crate::error::LedgerError;
use crate::ledger::UbiLedger;

/// `account`'s balance at one instant, broken into its parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub principal: u128,
    /// Unrealized accrual at the live factor.
    pub accrued: u128,
    /// Stream accrual not yet netted out of the principal.
    pub owed: u128,
    /// `(principal + accrued) ⊖ owed`.
    pub balance: u128,
}

impl UbiLedger {
    pub fn is_eligible(&self, account: &Address) -> bool {
        self.oracle.is_eligible(account)
    }

    /// `account`'s factor split into its own unit and its inbound unit.
    pub(crate) fn factor_split(&self, account: &Address) -> FactorSplit {
        self.accrual.split(
            account,
            self.is_eligible(account),
            self.delegation.is_delegating(account),
            self.delegation.inbound(account),
        )
    }

    /// The factor that is accruing right now: the own unit while `account`
    /// is eligible, plus the inbound unit while its delegator is eligible.
    pub fn live_factor(&self, account: &Address) -> u64 {
        let origin_eligible = self
            .delegation
            .inverse_delegate_of(account)
            .is_some_and(|origin| self.is_eligible(origin));
        self.factor_split(account)
            .live(self.is_eligible(account), origin_eligible)
    }

    /// Unrealized accrual of `account` at `now`, saturating on overflow.
    pub fn accrued_value(&self, account: &Address, now: Timestamp) -> u128 {
        self.accrual
            .accrued_checked(account, self.live_factor(account), now)
            .unwrap_or(u128::MAX)
    }

    pub(crate) fn resolve(&self, account: &Address, now: Timestamp) -> Result<Resolved, LedgerError> {
        let overflow = || LedgerError::Overflow(account.to_string());
        let principal = self.book.balance(account);
        let accrued = self
            .accrual
            .accrued_checked(account, self.live_factor(account), now)
            .ok_or_else(overflow)?;
        let owed = self.streams.undebited(account, now);
        let balance = principal
            .checked_add(accrued)
            .ok_or_else(overflow)?
            .saturating_sub(owed);
        Ok(Resolved {
            principal,
            accrued,
            owed,
            balance,
        })
    }

    /// `account`'s balance at `now`: realized principal plus pending
    /// accrual, minus what its streams have drawn since the last
    /// consolidation. Saturates at zero and at `u128::MAX`.
    pub fn balance_of(&self, account: &Address, now: Timestamp) -> u128 {
        let principal = self.book.balance(account);
        let owed = self.streams.undebited(account, now);
        principal
            .saturating_add(self.accrued_value(account, now))
            .saturating_sub(owed)
    }
}
