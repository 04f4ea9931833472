//! Ledger snapshots: persist and restore the full ledger state.
//!
//! The eligibility oracle is an external collaborator and is never
//! persisted; a restored ledger is handed a fresh one. Event subscribers
//! are not persisted either.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ubi_accrual::AccrualLedger;
use ubi_delegation::DelegationGraph;
use ubi_store::{LedgerStore, StoreError};
use ubi_stream::StreamRegistry;
use ubi_token::TokenBook;
use ubi_types::{Address, EligibilityOracle, LedgerParams, Timestamp};

use crate::event::EventBus;
use crate::ledger::{TokenMetadata, UbiLedger};
use crate::LedgerError;

const SNAPSHOT_KEY: &[u8] = b"ledger_snapshot";

/// The full persisted state of a ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Snapshot format version for compatibility.
    pub version: u32,
    pub params: LedgerParams,
    pub metadata: TokenMetadata,
    pub authority: Address,
    pub accrual: AccrualLedger,
    pub delegation: DelegationGraph,
    pub streams: StreamRegistry,
    pub book: TokenBook,
    pub last_seen: Timestamp,
}

impl LedgerSnapshot {
    pub const VERSION: u32 = 1;

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if snapshot.version != Self::VERSION {
            return Err(StoreError::Corruption(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

impl UbiLedger {
    /// Capture the current state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: LedgerSnapshot::VERSION,
            params: self.params.clone(),
            metadata: self.metadata.clone(),
            authority: self.authority.clone(),
            accrual: self.accrual.clone(),
            delegation: self.delegation.clone(),
            streams: self.streams.clone(),
            book: self.book.clone(),
            last_seen: self.last_seen,
        }
    }

    /// Rebuild a ledger from a snapshot, consulting `oracle` from now on.
    pub fn restore(
        snapshot: LedgerSnapshot,
        oracle: impl EligibilityOracle + Send + Sync + 'static,
    ) -> Self {
        Self {
            params: snapshot.params,
            metadata: snapshot.metadata,
            authority: snapshot.authority,
            oracle: Arc::new(oracle),
            accrual: snapshot.accrual,
            delegation: snapshot.delegation,
            streams: snapshot.streams,
            book: snapshot.book,
            last_seen: snapshot.last_seen,
            events: EventBus::new(),
        }
    }

    /// Persist all ledger state to a store.
    pub fn save_to_store(&self, store: &dyn LedgerStore) -> Result<(), LedgerError> {
        let bytes = self.snapshot().to_bytes()?;
        store.put_meta(SNAPSHOT_KEY, &bytes)?;
        Ok(())
    }

    /// Restore ledger state from a store.
    pub fn load_from_store(
        store: &dyn LedgerStore,
        oracle: impl EligibilityOracle + Send + Sync + 'static,
    ) -> Result<Self, LedgerError> {
        let bytes = store
            .get_meta(SNAPSHOT_KEY)?
            .ok_or_else(|| StoreError::NotFound("ledger_snapshot".to_string()))?;
        let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
        Ok(Self::restore(snapshot, oracle))
    }
}
