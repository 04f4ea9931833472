//! Per-account accrual state.

use serde::{Deserialize, Serialize};
use ubi_types::Timestamp;

/// How many identities' accrual an account currently absorbs.
///
/// `NeverDelegated` is the state of every account no delegation transition
/// has touched: it reads as 1 while the account is eligible and 0 otherwise.
/// The first transition that touches an account materializes the reading
/// into `Explicit`, which is authoritative from then on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccruingFactor {
    #[default]
    NeverDelegated,
    Explicit(u64),
}

impl AccruingFactor {
    /// The factor as the balance formula sees it.
    pub fn effective(&self, eligible: bool) -> u64 {
        match self {
            Self::NeverDelegated => u64::from(eligible),
            Self::Explicit(n) => *n,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Accrual state for a single account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAccrual {
    /// When the current accrual window began. `None` means not accruing.
    pub accrued_since: Option<Timestamp>,

    /// Accrual multiplier.
    pub factor: AccruingFactor,
}

impl AccountAccrual {
    /// Whether the accrual clock is running.
    pub fn is_running(&self) -> bool {
        self.accrued_since.is_some()
    }

    /// Seconds of unconsolidated accrual at `now` (0 when not running).
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        self.accrued_since
            .map(|since| since.elapsed_since(now))
            .unwrap_or(0)
    }

    /// Units the stored factor stands for, independent of eligibility.
    ///
    /// An untouched account holds its own unit exactly while its clock runs.
    pub fn units(&self) -> u64 {
        match self.factor {
            AccruingFactor::NeverDelegated => u64::from(self.is_running()),
            AccruingFactor::Explicit(n) => n,
        }
    }

    /// The own unit a delegation would move away from this account.
    ///
    /// Unlike [`split`](Self::split) this reads an untouched account through
    /// eligibility alone, so an eligible account that never started still
    /// holds its implicit unit.
    pub fn delegable(&self, eligible: bool, delegating: bool, inbound: u64) -> u64 {
        if delegating {
            return 0;
        }
        match self.factor {
            AccruingFactor::NeverDelegated => u64::from(eligible),
            AccruingFactor::Explicit(n) => n.saturating_sub(inbound),
        }
    }

    /// Split the stored factor into the account's own unit and the unit it
    /// receives from an inbound delegator.
    ///
    /// `delegating` is whether the account has redirected its own accrual;
    /// `inbound` is 1 when another account delegates to it.
    pub fn split(&self, eligible: bool, delegating: bool, inbound: u64) -> FactorSplit {
        let own = if delegating {
            0
        } else {
            match self.factor {
                AccruingFactor::NeverDelegated => u64::from(eligible && self.is_running()),
                AccruingFactor::Explicit(n) => n.saturating_sub(inbound),
            }
        };
        FactorSplit {
            own: if self.is_running() { own } else { 0 },
            inbound: if self.is_running() { inbound } else { 0 },
        }
    }
}

/// The two sources of an account's accruing factor.
///
/// Delegation is one level deep and an account receives at most one inbound
/// edge, so `own` and `inbound` are each 0 or 1 for a consistent ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FactorSplit {
    /// The account's own identity unit.
    pub own: u64,
    /// The unit redirected to this account by its delegator.
    pub inbound: u64,
}

impl FactorSplit {
    /// The live weight: each unit only counts while its origin is eligible.
    pub fn live(&self, own_eligible: bool, origin_eligible: bool) -> u64 {
        let own = if own_eligible { self.own } else { 0 };
        let inbound = if origin_eligible { self.inbound } else { 0 };
        own + inbound
    }
}
