//! The stream registry.

use crate::error::StreamError;
use crate::stream::{CreateStream, Stream, StreamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ubi_types::{Address, LedgerParams, Timestamp};

/// What the sender looks like at the moment it calls `create`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SenderContext {
    /// Oracle answer for the sender.
    pub eligible: bool,
    /// Whether the sender's own unit is accruing.
    pub accruing: bool,
    /// The sender's own per-second accrual rate.
    pub own_rate: u128,
}

/// All streams ever created, indexed by id, by sender, and by open
/// (sender, recipient) pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamRegistry {
    next_stream_id: StreamId,
    streams: BTreeMap<StreamId, Stream>,
    by_sender: HashMap<Address, Vec<StreamId>>,
    /// sender → recipient → most recent stream between them.
    latest_pair: HashMap<Address, HashMap<Address, StreamId>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            next_stream_id: 1,
            streams: BTreeMap::new(),
            by_sender: HashMap::new(),
            latest_pair: HashMap::new(),
        }
    }

    /// Number of streams ever created.
    pub fn count(&self) -> u64 {
        self.next_stream_id - 1
    }

    pub fn get(&self, id: StreamId) -> Result<&Stream, StreamError> {
        self.streams.get(&id).ok_or(StreamError::NotFound(id))
    }

    /// Ids of every stream `sender` has created, oldest first.
    pub fn streams_of(&self, sender: &Address) -> &[StreamId] {
        self.by_sender.get(sender).map(Vec::as_slice).unwrap_or(&[])
    }

    fn sponsored<'a>(&'a self, sender: &Address) -> impl Iterator<Item = &'a Stream> + 'a {
        self.streams_of(sender)
            .iter()
            .filter_map(move |id| self.streams.get(id))
    }

    /// Streams `sender` sponsors whose window has not ended at `now`.
    pub fn active_count(&self, sender: &Address, now: Timestamp) -> usize {
        self.sponsored(sender).filter(|s| s.is_active(now)).count()
    }

    /// Sum of the rates of `sender`'s streams that have not ended at `now`.
    pub fn committed_rate(&self, sender: &Address, now: Timestamp) -> Option<u128> {
        self.sponsored(sender)
            .filter(|s| s.is_active(now))
            .try_fold(0u128, |acc, s| acc.checked_add(s.rate_per_second))
    }

    /// Check a `create` call without mutating anything.
    pub fn validate_create(
        &self,
        sender: &Address,
        params: &CreateStream,
        ctx: SenderContext,
        ledger: &Address,
        now: Timestamp,
    ) -> Result<(), StreamError> {
        if !ctx.eligible {
            return Err(StreamError::NotEligible(sender.to_string()));
        }
        if !ctx.accruing {
            return Err(StreamError::NotAccruing(sender.to_string()));
        }
        if &params.asset != ledger {
            return Err(StreamError::ForeignAsset {
                expected: ledger.to_string(),
                got: params.asset.to_string(),
            });
        }
        if params.interval != LedgerParams::ACCRUAL_INTERVAL_SECS {
            return Err(StreamError::InvalidInterval {
                expected: LedgerParams::ACCRUAL_INTERVAL_SECS,
                got: params.interval,
            });
        }
        if params.rate_per_second == 0 {
            return Err(StreamError::ZeroRate);
        }
        if &params.recipient == sender {
            return Err(StreamError::SelfStream);
        }
        if params.start_time < now {
            return Err(StreamError::StartInPast {
                start: params.start_time.as_secs(),
                now: now.as_secs(),
            });
        }
        if params.start_time > params.stop_time {
            return Err(StreamError::InvalidWindow {
                start: params.start_time.as_secs(),
                stop: params.stop_time.as_secs(),
            });
        }
        if let Some(id) = self
            .latest_pair
            .get(sender)
            .and_then(|by_recipient| by_recipient.get(&params.recipient))
        {
            if self.get(*id)?.is_active(now) {
                return Err(StreamError::ActiveStreamExists(*id));
            }
        }
        let committed = self
            .committed_rate(sender, now)
            .ok_or(StreamError::Overflow)?;
        let available = ctx.own_rate.saturating_sub(committed);
        if params.rate_per_second > available {
            return Err(StreamError::RateExceedsAccrual {
                requested: params.rate_per_second,
                available,
            });
        }
        Ok(())
    }

    /// Create a stream and return its id.
    pub fn create(
        &mut self,
        sender: &Address,
        params: &CreateStream,
        ctx: SenderContext,
        ledger: &Address,
        now: Timestamp,
    ) -> Result<StreamId, StreamError> {
        self.validate_create(sender, params, ctx, ledger, now)?;
        let id = self.next_stream_id;
        self.next_stream_id = id.checked_add(1).ok_or(StreamError::Overflow)?;
        self.streams.insert(
            id,
            Stream {
                id,
                sender: sender.clone(),
                recipient: params.recipient.clone(),
                start_time: params.start_time,
                stop_time: params.stop_time,
                rate_per_second: params.rate_per_second,
                debited: 0,
                withdrawn: 0,
            },
        );
        self.by_sender.entry(sender.clone()).or_default().push(id);
        self.latest_pair
            .entry(sender.clone())
            .or_default()
            .insert(params.recipient.clone(), id);
        Ok(id)
    }

    /// Stream accrual at `now`.
    pub fn accrued(&self, id: StreamId, now: Timestamp) -> Result<u128, StreamError> {
        Ok(self.get(id)?.accrued(now))
    }

    /// A party's balance in a stream: 0 for the sender, the withdrawable
    /// amount for the recipient.
    pub fn balance_of(&self, id: StreamId, who: &Address, now: Timestamp) -> Result<u128, StreamError> {
        let stream = self.get(id)?;
        if who == &stream.recipient {
            Ok(stream.withdrawable(now))
        } else if who == &stream.sender {
            Ok(0)
        } else {
            Err(StreamError::NotParty {
                who: who.to_string(),
                id,
            })
        }
    }

    /// Check a withdrawal without mutating anything.
    pub fn validate_withdraw(
        &self,
        id: StreamId,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StreamError> {
        let stream = self.get(id)?;
        if caller != &stream.recipient {
            return Err(StreamError::NotRecipient(id));
        }
        if amount == 0 {
            return Err(StreamError::ZeroAmount);
        }
        let available = stream.withdrawable(now);
        if amount > available {
            return Err(StreamError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Withdraw `amount` from stream `id`. The caller credits the recipient.
    pub fn withdraw(
        &mut self,
        id: StreamId,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, StreamError> {
        self.validate_withdraw(id, caller, amount, now)?;
        let stream = self.streams.get_mut(&id).ok_or(StreamError::NotFound(id))?;
        stream.withdrawn = stream
            .withdrawn
            .checked_add(amount)
            .ok_or(StreamError::Overflow)?;
        Ok(amount)
    }

    /// Total accrual of `sender`'s streams not yet netted out of its principal.
    pub fn undebited(&self, sender: &Address, now: Timestamp) -> u128 {
        self.sponsored(sender)
            .filter(|s| !s.is_settled(now))
            .fold(0u128, |acc, s| acc.saturating_add(s.undebited(now)))
    }

    /// Mark all of `sender`'s stream accrual up to `now` as netted out,
    /// returning the amount newly debited.
    pub fn settle_debits(&mut self, sender: &Address, now: Timestamp) -> u128 {
        let ids = match self.by_sender.get(sender) {
            Some(ids) => ids.clone(),
            None => return 0,
        };
        let mut total = 0u128;
        for id in ids {
            if let Some(stream) = self.streams.get_mut(&id) {
                if stream.is_settled(now) {
                    continue;
                }
                let accrued = stream.accrued(now);
                total = total.saturating_add(accrued.saturating_sub(stream.debited));
                stream.debited = accrued;
            }
        }
        total
    }

    /// Iterate over every stream, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.streams.values()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
