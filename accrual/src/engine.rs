//! Core accrual computation engine.

use crate::error::AccrualError;
use crate::state::{AccountAccrual, AccruingFactor, FactorSplit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ubi_types::{Address, Timestamp};

/// The accrual ledger: per-account clocks and factors over one global rate.
///
/// Evaluation is lazy: nothing is stored per second, only the start of each
/// account's current window and its multiplier. Eligibility is never stored
/// here; callers pass what the oracle says for the operation in progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccrualLedger {
    /// Raw units per second per accruing identity.
    rate: u128,
    accounts: HashMap<Address, AccountAccrual>,
}

impl AccrualLedger {
    pub fn new(rate: u128) -> Self {
        Self {
            rate,
            accounts: HashMap::new(),
        }
    }

    /// The per-identity accrual rate.
    pub fn rate(&self) -> u128 {
        self.rate
    }

    /// Accrual state of `account` (the zero state if never seen).
    pub fn account(&self, account: &Address) -> AccountAccrual {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Iterate over every account the ledger has stored state for.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &AccountAccrual)> {
        self.accounts.iter()
    }

    pub fn accrued_since(&self, account: &Address) -> Option<Timestamp> {
        self.account(account).accrued_since
    }

    /// The factor as the balance formula reads it (lazy default applied).
    pub fn effective_factor(&self, account: &Address, eligible: bool) -> u64 {
        self.account(account).factor.effective(eligible)
    }

    /// Split `account`'s factor into own and inbound units.
    pub fn split(
        &self,
        account: &Address,
        eligible: bool,
        delegating: bool,
        inbound: u64,
    ) -> FactorSplit {
        self.account(account).split(eligible, delegating, inbound)
    }

    /// The own unit `account` could delegate away (lazy default applied).
    pub fn delegable_units(
        &self,
        account: &Address,
        eligible: bool,
        delegating: bool,
        inbound: u64,
    ) -> u64 {
        self.account(account).delegable(eligible, delegating, inbound)
    }

    /// Unrealized accrual of `account` at `now` for a given live weight.
    ///
    /// `rate × (now − accrued_since) × weight`, or 0 when the clock is not
    /// running. Returns `None` on overflow.
    pub fn accrued_checked(&self, account: &Address, weight: u64, now: Timestamp) -> Option<u128> {
        let elapsed = self.account(account).elapsed(now);
        self.rate
            .checked_mul(u128::from(elapsed))?
            .checked_mul(u128::from(weight))
    }

    /// Unrealized accrual, returning 0 on overflow.
    pub fn accrued(&self, account: &Address, weight: u64, now: Timestamp) -> u128 {
        self.accrued_checked(account, weight, now).unwrap_or(0)
    }

    /// Check that `account` may start accruing its own unit.
    pub fn check_start(
        &self,
        account: &Address,
        eligible: bool,
        delegating: bool,
        inbound: u64,
    ) -> Result<(), AccrualError> {
        if !eligible {
            return Err(AccrualError::NotEligible(account.to_string()));
        }
        if delegating {
            return Err(AccrualError::Delegating(account.to_string()));
        }
        if self.split(account, eligible, delegating, inbound).own > 0 {
            return Err(AccrualError::AlreadyAccruing(account.to_string()));
        }
        Ok(())
    }

    /// Start accruing `account`'s own unit at `now`.
    ///
    /// Any unit already running on the account (an inbound delegation) must
    /// have been consolidated by the caller; the clock restarts at `now`.
    pub fn start_accruing(
        &mut self,
        account: &Address,
        eligible: bool,
        delegating: bool,
        inbound: u64,
        now: Timestamp,
    ) -> Result<(), AccrualError> {
        self.check_start(account, eligible, delegating, inbound)?;
        let state = self.accounts.entry(account.clone()).or_default();
        if let AccruingFactor::Explicit(n) = state.factor {
            let with_own = inbound.checked_add(1).ok_or(AccrualError::Overflow)?;
            state.factor = AccruingFactor::Explicit(with_own.max(n));
        }
        state.accrued_since = Some(now);
        Ok(())
    }

    /// Check that `account` may be reported as removed, returning the number
    /// of own units whose accrual becomes the reporter's bounty.
    pub fn check_removal(
        &self,
        account: &Address,
        eligible: bool,
        delegating: bool,
        inbound: u64,
    ) -> Result<u64, AccrualError> {
        if eligible {
            return Err(AccrualError::StillEligible(account.to_string()));
        }
        // The bounty ignores eligibility: it is exactly what the removed
        // identity had accrued but not yet realized.
        let own = self.split(account, true, delegating, inbound).own;
        if own == 0 {
            return Err(AccrualError::NotAccruing(account.to_string()));
        }
        Ok(own)
    }

    /// Drop `account`'s own unit, keeping any inbound unit accruing from `now`.
    pub fn remove_own_unit(&mut self, account: &Address, inbound: u64, now: Timestamp) {
        let state = self.accounts.entry(account.clone()).or_default();
        state.factor = AccruingFactor::Explicit(inbound);
        state.accrued_since = if inbound > 0 { Some(now) } else { None };
    }

    /// Add one unit to `account`'s factor, materializing the lazy default.
    pub fn increment_factor(&mut self, account: &Address) -> Result<u64, AccrualError> {
        let state = self.accounts.entry(account.clone()).or_default();
        let next = state.units().checked_add(1).ok_or(AccrualError::Overflow)?;
        state.factor = AccruingFactor::Explicit(next);
        Ok(next)
    }

    /// Remove one unit from `account`'s factor, materializing the lazy default.
    ///
    /// An untouched account gives up its implicit unit while it is eligible,
    /// whether or not its clock has started.
    pub fn decrement_factor(
        &mut self,
        account: &Address,
        eligible: bool,
    ) -> Result<u64, AccrualError> {
        let state = self.account(account);
        let held = match state.factor {
            AccruingFactor::NeverDelegated => state.units().max(u64::from(eligible)),
            AccruingFactor::Explicit(n) => n,
        };
        let next = held
            .checked_sub(1)
            .ok_or_else(|| AccrualError::FactorUnderflow(account.to_string()))?;
        self.accounts.entry(account.clone()).or_default().factor = AccruingFactor::Explicit(next);
        Ok(next)
    }

    /// Restart a running clock at `now` (a no-op for a stopped clock).
    pub fn reset_clock(&mut self, account: &Address, now: Timestamp) {
        if let Some(state) = self.accounts.get_mut(account) {
            if state.accrued_since.is_some() {
                state.accrued_since = Some(now);
            }
        }
    }

    /// After a factor change: run the clock from `now` while any unit
    /// remains, stop it otherwise.
    pub fn settle_clock(&mut self, account: &Address, now: Timestamp) {
        let state = self.accounts.entry(account.clone()).or_default();
        state.accrued_since = if state.units() > 0 { Some(now) } else { None };
    }

    /// Sum of factors over every tracked account, reading untouched
    /// accounts through `eligible`.
    pub fn total_factor(&self, eligible: impl Fn(&Address) -> bool) -> u64 {
        self.accounts
            .iter()
            .map(|(address, state)| state.factor.effective(eligible(address)))
            .sum()
    }
}

impl Default for AccrualLedger {
    fn default() -> Self {
        Self::new(0)
    }
}
