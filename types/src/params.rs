//! Ledger parameters fixed at construction.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Parameters every engine in the ledger reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Accrual rate: raw units per second per accruing identity.
    pub accrual_rate: u128,

    /// The ledger's own asset identifier. Streams must name it.
    pub ledger_address: Address,
}

impl LedgerParams {
    /// Atomic accrual granularity in seconds. Streams must use exactly this.
    pub const ACCRUAL_INTERVAL_SECS: u64 = 1;

    /// 10^18 raw units per whole token, matching 18 decimals.
    pub const UNIT: u128 = 1_000_000_000_000_000_000;

    /// One whole token per hour, expressed per second (rounded up).
    pub const RATE_1_PER_HOUR: u128 = Self::UNIT / 3600 + 1;

    pub fn new(accrual_rate: u128, ledger_address: Address) -> Self {
        Self {
            accrual_rate,
            ledger_address,
        }
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self::new(Self::RATE_1_PER_HOUR, Address::new("ubi_ledger"))
    }
}
