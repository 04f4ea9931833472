//! Events emitted by ledger entry points for subscribers.

use serde::{Deserialize, Serialize};
use ubi_stream::StreamId;
use ubi_types::{Address, Timestamp};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
///
/// Field order within each variant is part of the external contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Value moved between principal balances. `None` on the `from` side is
    /// a mint, `None` on the `to` side is a burn.
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: u128,
    },
    /// An allowance was set to `amount`.
    Approval {
        owner: Address,
        spender: Address,
        amount: u128,
    },
    /// `delegator` now redirects its accrual to `delegate` (`None`: to itself).
    DelegationChanged {
        delegator: Address,
        delegate: Option<Address>,
    },
    StreamCreated {
        stream_id: StreamId,
        sender: Address,
        recipient: Address,
        asset: Address,
        start_time: Timestamp,
        stop_time: Timestamp,
        rate_per_second: u128,
        interval: u64,
    },
    StreamWithdrawn {
        stream_id: StreamId,
        recipient: Address,
        amount: u128,
    },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline, after the emitting operation has fully
/// applied its effect.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
