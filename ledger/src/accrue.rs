//! Starting accrual and reporting removed identities.

use tracing::info;
use ubi_types::{Address, Timestamp};

use crate::error::{LedgerError, LogRejection};
use crate::event::LedgerEvent;
use crate::ledger::UbiLedger;

impl UbiLedger {
    /// Start accruing `account`'s own unit at `now`.
    ///
    /// Anyone may call this for any eligible account. An inbound unit
    /// already running on `account` is consolidated first.
    pub fn start_accruing(
        &mut self,
        caller: &Address,
        account: &Address,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let eligible = self.is_eligible(account);
        let delegating = self.delegation.is_delegating(account);
        let inbound = self.delegation.inbound(account);
        let plan = self
            .check_time(now)
            .and_then(|_| {
                self.accrual
                    .check_start(account, eligible, delegating, inbound)?;
                let plan = self.plan_consolidation(account, now)?;
                self.supply_after(&[&plan], 0, 0)?;
                Ok(plan)
            })
            .log_rejection("start_accruing")?;

        self.apply_consolidation(&plan, now)?;
        self.accrual
            .start_accruing(account, eligible, delegating, inbound, now)?;
        self.advance(now);
        info!(caller = %caller, account = %account, at = now.as_secs(), "accrual started");
        Ok(())
    }

    /// Report that `account` is no longer eligible.
    ///
    /// The caller collects what `account`'s own unit accrued but never
    /// realized. Any inbound unit keeps accruing on `account`. Returns the
    /// bounty paid.
    pub fn report_removal(
        &mut self,
        caller: &Address,
        account: &Address,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        let inbound = self.delegation.inbound(account);
        let (plan, bounty) = self
            .check_time(now)
            .and_then(|_| {
                let own = self.accrual.check_removal(
                    account,
                    self.is_eligible(account),
                    self.delegation.is_delegating(account),
                    inbound,
                )?;
                let bounty = self
                    .accrual
                    .accrued_checked(account, own, now)
                    .ok_or_else(|| LedgerError::Overflow(account.to_string()))?;
                // `account` is ineligible, so its live factor already
                // excludes the own unit: this realizes the inbound share only.
                let plan = self.plan_consolidation(account, now)?;
                self.supply_after(&[&plan], bounty, 0)?;
                Ok((plan, bounty))
            })
            .log_rejection("report_removal")?;

        self.apply_consolidation(&plan, now)?;
        self.accrual.remove_own_unit(account, inbound, now);
        if bounty > 0 {
            self.book.mint(caller, bounty)?;
        }
        self.advance(now);
        info!(
            caller = %caller,
            account = %account,
            bounty = %bounty,
            at = now.as_secs(),
            "removal reported"
        );
        if bounty > 0 {
            self.emit(LedgerEvent::Transfer {
                from: None,
                to: Some(caller.clone()),
                amount: bounty,
            });
        }
        Ok(bounty)
    }
}
