//! Plain token entry points, layered on resolved balances.

use tracing::info;
use ubi_token::TokenError;
use ubi_types::{Address, Timestamp};

use crate::consolidate::Consolidation;
use crate::error::{LedgerError, LogRejection};
use crate::event::LedgerEvent;
use crate::ledger::UbiLedger;

impl UbiLedger {
    /// Consolidate-and-debit plan: `amount` must fit `account`'s resolved
    /// balance at `now`.
    fn plan_debit(
        &self,
        account: &Address,
        amount: u128,
        burned: u128,
        now: Timestamp,
    ) -> Result<Consolidation, LedgerError> {
        self.check_time(now)?;
        let plan = self.plan_consolidation(account, now)?;
        if amount > plan.principal_after {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available: plan.principal_after,
            }
            .into());
        }
        self.supply_after(&[&plan], 0, burned)?;
        Ok(plan)
    }

    /// Send `amount` of `caller`'s balance to `to`.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let plan = self
            .plan_debit(caller, amount, 0, now)
            .log_rejection("transfer")?;
        self.apply_consolidation(&plan, now)?;
        self.book.transfer(caller, to, amount)?;
        self.advance(now);
        info!(from = %caller, to = %to, amount = %amount, "transfer");
        self.emit(LedgerEvent::Transfer {
            from: Some(caller.clone()),
            to: Some(to.clone()),
            amount,
        });
        Ok(())
    }

    /// Send `amount` of `owner`'s balance to `to`, spending `spender`'s
    /// allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let plan = self
            .book
            .check_allowance(owner, spender, amount)
            .map_err(LedgerError::from)
            .and_then(|_| self.plan_debit(owner, amount, 0, now))
            .log_rejection("transfer_from")?;
        self.apply_consolidation(&plan, now)?;
        self.book.spend_allowance(owner, spender, amount)?;
        self.book.transfer(owner, to, amount)?;
        self.advance(now);
        info!(spender = %spender, from = %owner, to = %to, amount = %amount, "transfer_from");
        self.emit(LedgerEvent::Transfer {
            from: Some(owner.clone()),
            to: Some(to.clone()),
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of `caller`'s balance.
    pub fn burn(&mut self, caller: &Address, amount: u128, now: Timestamp) -> Result<(), LedgerError> {
        let plan = self
            .plan_debit(caller, amount, amount, now)
            .log_rejection("burn")?;
        self.apply_consolidation(&plan, now)?;
        self.book.burn(caller, amount)?;
        self.advance(now);
        info!(from = %caller, amount = %amount, "burn");
        self.emit(LedgerEvent::Transfer {
            from: Some(caller.clone()),
            to: None,
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of `owner`'s balance, spending `spender`'s allowance.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let plan = self
            .book
            .check_allowance(owner, spender, amount)
            .map_err(LedgerError::from)
            .and_then(|_| self.plan_debit(owner, amount, amount, now))
            .log_rejection("burn_from")?;
        self.apply_consolidation(&plan, now)?;
        self.book.spend_allowance(owner, spender, amount)?;
        self.book.burn(owner, amount)?;
        self.advance(now);
        info!(spender = %spender, from = %owner, amount = %amount, "burn_from");
        self.emit(LedgerEvent::Transfer {
            from: Some(owner.clone()),
            to: None,
            amount,
        });
        Ok(())
    }

    /// Set `spender`'s allowance over `caller`'s balance.
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.check_time(now).log_rejection("approve")?;
        self.book.approve(caller, spender, amount);
        self.advance(now);
        self.emit_approval(caller, spender);
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        added: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.check_time(now)
            .and_then(|_| Ok(self.book.increase_allowance(caller, spender, added)?))
            .log_rejection("increase_allowance")?;
        self.advance(now);
        self.emit_approval(caller, spender);
        Ok(())
    }

    pub fn decrease_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        subtracted: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.check_time(now)
            .and_then(|_| Ok(self.book.decrease_allowance(caller, spender, subtracted)?))
            .log_rejection("decrease_allowance")?;
        self.advance(now);
        self.emit_approval(caller, spender);
        Ok(())
    }

    fn emit_approval(&self, owner: &Address, spender: &Address) {
        let amount = self.book.allowance(owner, spender);
        info!(owner = %owner, spender = %spender, amount = %amount, "approval");
        self.emit(LedgerEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        });
    }
}
