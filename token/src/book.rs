//! Principal balances, allowances and total supply.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ubi_types::Address;

/// The realized side of the ledger.
///
/// `total_supply` always equals the sum of every principal balance. All
/// mutators check their arithmetic before touching state, so a failed call
/// leaves the book unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenBook {
    balances: HashMap<Address, u128>,
    /// owner → spender → approved amount.
    allowances: HashMap<Address, HashMap<Address, u128>>,
    total_supply: u128,
}

impl TokenBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Principal balance of `account`.
    pub fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|by_spender| by_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over every non-zero principal balance.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter().filter(|(_, amount)| **amount > 0)
    }

    fn set_balance(&mut self, account: &Address, amount: u128) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), amount);
        }
    }

    /// Create `amount` out of nothing on `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), TokenError> {
        let balance = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(to, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Destroy `amount` of `from`'s principal.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance(from);
        let balance = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(from, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Overwrite `account`'s principal, moving total supply by the difference.
    pub fn rebase(&mut self, account: &Address, principal: u128) -> Result<(), TokenError> {
        let current = self.balance(account);
        let supply = if principal >= current {
            self.total_supply.checked_add(principal - current)
        } else {
            self.total_supply.checked_sub(current - principal)
        }
        .ok_or(TokenError::Overflow)?;
        self.set_balance(account, principal);
        self.total_supply = supply;
        Ok(())
    }

    /// Check that `from` can send `amount` to `to`.
    pub fn check_transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance(from);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from != to {
            self.balance(to)
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
        }
        Ok(())
    }

    /// Move `amount` of principal from `from` to `to`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        self.check_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }
        let from_balance = self.balance(from) - amount;
        let to_balance = self.balance(to) + amount;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s balance.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        let by_spender = self.allowances.entry(owner.clone()).or_default();
        if amount == 0 {
            by_spender.remove(spender);
            if by_spender.is_empty() {
                self.allowances.remove(owner);
            }
        } else {
            by_spender.insert(spender.clone(), amount);
        }
    }

    /// Raise an allowance, returning the new value.
    pub fn increase_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: u128,
    ) -> Result<u128, TokenError> {
        let next = self
            .allowance(owner, spender)
            .checked_add(added)
            .ok_or(TokenError::Overflow)?;
        self.approve(owner, spender, next);
        Ok(next)
    }

    /// Lower an allowance, returning the new value.
    pub fn decrease_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: u128,
    ) -> Result<u128, TokenError> {
        let current = self.allowance(owner, spender);
        let next = current
            .checked_sub(subtracted)
            .ok_or(TokenError::AllowanceUnderflow {
                current,
                decrease: subtracted,
            })?;
        self.approve(owner, spender, next);
        Ok(next)
    }

    /// Check that `spender` may move `amount` on behalf of `owner`.
    pub fn check_allowance(&self, owner: &Address, spender: &Address, amount: u128) -> Result<(), TokenError> {
        let approved = self.allowance(owner, spender);
        if amount > approved {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        Ok(())
    }

    /// Consume `amount` of `spender`'s allowance, returning what remains.
    pub fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<u128, TokenError> {
        self.check_allowance(owner, spender, amount)?;
        let remaining = self.allowance(owner, spender) - amount;
        self.approve(owner, spender, remaining);
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> Address {
        Address::new(format!("ubi_{name}"))
    }

    #[test]
    fn mint_and_burn_track_supply() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 100).unwrap();
        book.mint(&addr("b"), 50).unwrap();
        assert_eq!(book.total_supply(), 150);
        book.burn(&addr("a"), 30).unwrap();
        assert_eq!(book.balance(&addr("a")), 70);
        assert_eq!(book.total_supply(), 120);
    }

    #[test]
    fn burn_more_than_balance_fails() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 10).unwrap();
        let err = book.burn(&addr("a"), 11).unwrap_err();
        assert_eq!(err, TokenError::InsufficientBalance { needed: 11, available: 10 });
        assert_eq!(err.kind(), ubi_types::ErrorKind::InvariantViolation);
        assert_eq!(book.total_supply(), 10);
    }

    #[test]
    fn transfer_moves_principal() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 100).unwrap();
        book.transfer(&addr("a"), &addr("b"), 40).unwrap();
        assert_eq!(book.balance(&addr("a")), 60);
        assert_eq!(book.balance(&addr("b")), 40);
        assert_eq!(book.total_supply(), 100);
    }

    #[test]
    fn self_transfer_is_a_no_op() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 5).unwrap();
        book.transfer(&addr("a"), &addr("a"), 5).unwrap();
        assert_eq!(book.balance(&addr("a")), 5);
        assert!(book.transfer(&addr("a"), &addr("a"), 6).is_err());
    }

    #[test]
    fn rebase_moves_supply_both_ways() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 100).unwrap();
        book.rebase(&addr("a"), 160).unwrap();
        assert_eq!(book.total_supply(), 160);
        book.rebase(&addr("a"), 20).unwrap();
        assert_eq!(book.total_supply(), 20);
        assert_eq!(book.balance(&addr("a")), 20);
    }

    #[test]
    fn allowance_lifecycle() {
        let mut book = TokenBook::new();
        let (owner, spender) = (addr("owner"), addr("spender"));
        book.approve(&owner, &spender, 10);
        assert_eq!(book.increase_allowance(&owner, &spender, 5), Ok(15));
        assert_eq!(book.decrease_allowance(&owner, &spender, 3), Ok(12));
        assert_eq!(
            book.decrease_allowance(&owner, &spender, 13),
            Err(TokenError::AllowanceUnderflow { current: 12, decrease: 13 })
        );
        assert_eq!(book.spend_allowance(&owner, &spender, 12), Ok(0));
        let err = book.spend_allowance(&owner, &spender, 1).unwrap_err();
        assert_eq!(err.kind(), ubi_types::ErrorKind::Authorization);
    }

    #[test]
    fn zero_balances_are_not_listed() {
        let mut book = TokenBook::new();
        book.mint(&addr("a"), 1).unwrap();
        book.burn(&addr("a"), 1).unwrap();
        assert_eq!(book.balances().count(), 0);
    }
}
