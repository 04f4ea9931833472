//! The ledger façade: owned state, read surface, governance.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use ubi_accrual::AccrualLedger;
use ubi_delegation::DelegationGraph;
use ubi_stream::{Stream, StreamId, StreamRegistry};
use ubi_token::TokenBook;
use ubi_types::{Address, EligibilityOracle, LedgerParams, Timestamp};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LogRejection};
use crate::event::{EventBus, LedgerEvent};

/// The oracle handle the ledger consults. Shared so a host can keep a
/// reference to the same registry.
pub type SharedOracle = Arc<dyn EligibilityOracle + Send + Sync>;

/// Token presentation metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The UBI ledger.
///
/// Operations are serialized by the host: every entry point runs to
/// completion before the next one starts, and `now` never goes backwards
/// across mutating calls.
pub struct UbiLedger {
    pub(crate) params: LedgerParams,
    pub(crate) metadata: TokenMetadata,
    pub(crate) authority: Address,
    pub(crate) oracle: SharedOracle,
    pub(crate) accrual: AccrualLedger,
    pub(crate) delegation: DelegationGraph,
    pub(crate) streams: StreamRegistry,
    pub(crate) book: TokenBook,
    /// Latest `now` a mutating call executed at.
    pub(crate) last_seen: Timestamp,
    pub(crate) events: EventBus,
}

impl UbiLedger {
    pub fn new(
        params: LedgerParams,
        metadata: TokenMetadata,
        authority: Address,
        oracle: impl EligibilityOracle + Send + Sync + 'static,
    ) -> Self {
        Self {
            accrual: AccrualLedger::new(params.accrual_rate),
            params,
            metadata,
            authority,
            oracle: Arc::new(oracle),
            delegation: DelegationGraph::new(),
            streams: StreamRegistry::new(),
            book: TokenBook::new(),
            last_seen: Timestamp::EPOCH,
            events: EventBus::new(),
        }
    }

    pub fn from_config(
        config: &LedgerConfig,
        oracle: impl EligibilityOracle + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            config.params(),
            config.metadata(),
            config.authority.clone(),
            oracle,
        )
    }

    /// Register a listener for every event emitted from now on.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub(crate) fn emit(&self, event: LedgerEvent) {
        self.events.emit(&event);
    }

    /// Reject a mutating call whose `now` precedes one already executed.
    pub(crate) fn check_time(&self, now: Timestamp) -> Result<(), LedgerError> {
        if now < self.last_seen {
            return Err(LedgerError::TimeRegression {
                now: now.as_secs(),
                last: self.last_seen.as_secs(),
            });
        }
        Ok(())
    }

    pub(crate) fn advance(&mut self, now: Timestamp) {
        self.last_seen = self.last_seen.max(now);
    }

    // ── Metadata ───────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn authority(&self) -> &Address {
        &self.authority
    }

    pub fn last_seen(&self) -> Timestamp {
        self.last_seen
    }

    // ── Read surface ───────────────────────────────────────────────────

    /// Sum of realized principal balances.
    pub fn total_supply(&self) -> u128 {
        self.book.total_supply()
    }

    /// Realized principal of `account`, without pending accrual.
    pub fn principal(&self, account: &Address) -> u128 {
        self.book.balance(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.book.allowance(owner, spender)
    }

    /// The accruing factor as the balance formula reads it.
    pub fn accruing_factor(&self, account: &Address) -> u64 {
        self.accrual
            .effective_factor(account, self.is_eligible(account))
    }

    /// When `account`'s current accrual window began, if it is accruing.
    pub fn accrued_since(&self, account: &Address) -> Option<Timestamp> {
        self.accrual.accrued_since(account)
    }

    /// Sum of stored factors, reading untouched accounts through the oracle.
    pub fn total_factor(&self) -> u64 {
        self.accrual.total_factor(|account| self.is_eligible(account))
    }

    pub fn delegate_of(&self, account: &Address) -> Option<&Address> {
        self.delegation.delegate_of(account)
    }

    pub fn inverse_delegate_of(&self, account: &Address) -> Option<&Address> {
        self.delegation.inverse_delegate_of(account)
    }

    pub fn stream(&self, id: StreamId) -> Result<&Stream, LedgerError> {
        Ok(self.streams.get(id)?)
    }

    /// A party's balance in stream `id` at `now`.
    pub fn stream_balance_of(
        &self,
        id: StreamId,
        who: &Address,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        Ok(self.streams.balance_of(id, who, now)?)
    }

    pub fn stream_accrued(&self, id: StreamId, now: Timestamp) -> Result<u128, LedgerError> {
        Ok(self.streams.accrued(id, now)?)
    }

    /// Number of streams ever created.
    pub fn stream_count(&self) -> u64 {
        self.streams.count()
    }

    pub fn streams_of(&self, sender: &Address) -> &[StreamId] {
        self.streams.streams_of(sender)
    }

    // ── Governance ─────────────────────────────────────────────────────

    fn check_authority(&self, caller: &Address) -> Result<(), LedgerError> {
        if caller != &self.authority {
            return Err(LedgerError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    /// Replace the eligibility oracle.
    pub fn change_oracle(
        &mut self,
        caller: &Address,
        oracle: impl EligibilityOracle + Send + Sync + 'static,
    ) -> Result<(), LedgerError> {
        self.check_authority(caller).log_rejection("change_oracle")?;
        self.oracle = Arc::new(oracle);
        info!(caller = %caller, "eligibility oracle changed");
        Ok(())
    }

    /// Hand governance to `new_authority`.
    pub fn change_authority(
        &mut self,
        caller: &Address,
        new_authority: Address,
    ) -> Result<(), LedgerError> {
        self.check_authority(caller).log_rejection("change_authority")?;
        info!(caller = %caller, new_authority = %new_authority, "authority changed");
        self.authority = new_authority;
        Ok(())
    }
}
