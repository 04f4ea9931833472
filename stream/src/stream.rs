//! Stream records.

use serde::{Deserialize, Serialize};
use ubi_types::{Address, Timestamp};

/// Unique identifier for a stream. Ids start at 1; 0 is never allocated.
pub type StreamId = u64;

/// Parameters of a `create` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStream {
    pub recipient: Address,
    /// Must identify this ledger.
    pub asset: Address,
    pub start_time: Timestamp,
    pub stop_time: Timestamp,
    pub rate_per_second: u128,
    /// Payment granularity in seconds. Must equal the accrual interval.
    pub interval: u64,
}

/// A stream of accrual from `sender` to `recipient`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: StreamId,
    pub sender: Address,
    pub recipient: Address,
    pub start_time: Timestamp,
    pub stop_time: Timestamp,
    /// Fixed at creation; does not follow later changes to the sender's rate.
    pub rate_per_second: u128,
    /// Accrual already netted out of the sender's principal.
    pub debited: u128,
    /// Accrual the recipient has withdrawn.
    pub withdrawn: u128,
}

impl Stream {
    /// Accrual at `now`: 0 before the window, frozen after it.
    ///
    /// `rate × (min(now, stop) − start)`. Returns `None` on overflow.
    pub fn accrued_checked(&self, now: Timestamp) -> Option<u128> {
        if now < self.start_time {
            return Some(0);
        }
        let end = now.min(self.stop_time);
        let elapsed = self.start_time.elapsed_since(end);
        self.rate_per_second.checked_mul(u128::from(elapsed))
    }

    /// Accrual at `now`, saturating on overflow.
    pub fn accrued(&self, now: Timestamp) -> u128 {
        self.accrued_checked(now).unwrap_or(u128::MAX)
    }

    /// Whether the window is still open (or not yet started) at `now`.
    ///
    /// An empty window (`start == stop`) never accrues and is never active.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.start_time < self.stop_time && self.stop_time > now
    }

    /// What the recipient can withdraw at `now`.
    pub fn withdrawable(&self, now: Timestamp) -> u128 {
        self.accrued(now).saturating_sub(self.withdrawn)
    }

    /// Accrual not yet netted out of the sender's principal.
    pub fn undebited(&self, now: Timestamp) -> u128 {
        self.accrued(now).saturating_sub(self.debited)
    }

    /// Whether the stream can never change a balance again after `now`.
    pub fn is_settled(&self, now: Timestamp) -> bool {
        !self.is_active(now) && self.undebited(now) == 0
    }
}
