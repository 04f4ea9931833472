use proptest::prelude::*;

use ubi_stream::{CreateStream, SenderContext, StreamError, StreamRegistry};
use ubi_types::{Address, Timestamp};

fn sender() -> Address {
    Address::new("ubi_sender")
}

fn recipient() -> Address {
    Address::new("ubi_recipient")
}

fn ledger() -> Address {
    Address::new("ubi_ledger")
}

fn open(start: u64, duration: u64, rate: u128) -> (StreamRegistry, u64) {
    let mut reg = StreamRegistry::new();
    let params = CreateStream {
        recipient: recipient(),
        asset: ledger(),
        start_time: Timestamp::new(start),
        stop_time: Timestamp::new(start + duration),
        rate_per_second: rate,
        interval: 1,
    };
    let ctx = SenderContext {
        eligible: true,
        accruing: true,
        own_rate: rate,
    };
    let id = reg
        .create(&sender(), &params, ctx, &ledger(), Timestamp::new(start))
        .unwrap();
    (reg, id)
}

proptest! {
    /// Stream accrual stops growing at the stop time.
    #[test]
    fn accrual_frozen_after_stop(
        start in 0u64..1_000_000,
        duration in 0u64..1_000_000,
        after in 0u64..1_000_000,
        rate in 1u128..1_000_000_000,
    ) {
        let (reg, id) = open(start, duration, rate);
        let stop = Timestamp::new(start + duration);
        let at_stop = reg.accrued(id, stop).unwrap();
        prop_assert_eq!(at_stop, rate * duration as u128);
        prop_assert_eq!(reg.accrued(id, stop.plus(after)).unwrap(), at_stop);
    }

    /// Withdrawals never exceed what the stream has accrued, and draining
    /// it makes any further positive withdrawal fail.
    #[test]
    fn withdrawals_bounded_by_accrual(
        duration in 1u64..10_000,
        rate in 1u128..1_000,
        chunks in proptest::collection::vec(1u128..5_000, 1..20),
        elapsed in 0u64..20_000,
    ) {
        let (mut reg, id) = open(0, duration, rate);
        let now = Timestamp::new(elapsed);
        let accrued = reg.accrued(id, now).unwrap();
        let mut total = 0u128;
        for chunk in chunks {
            if reg.withdraw(id, &recipient(), chunk, now).is_ok() {
                total += chunk;
            }
            prop_assert!(total <= accrued);
        }
        let rest = reg.balance_of(id, &recipient(), now).unwrap();
        prop_assert_eq!(rest, accrued - total);
        if rest > 0 {
            reg.withdraw(id, &recipient(), rest, now).unwrap();
        }
        let is_insufficient = matches!(
            reg.withdraw(id, &recipient(), 1, now),
            Err(StreamError::InsufficientBalance { .. })
        );
        prop_assert!(is_insufficient);
    }

    /// The sender's share of a stream is never withdrawable.
    #[test]
    fn sender_balance_is_zero(
        duration in 0u64..100_000,
        rate in 1u128..1_000_000,
        now in 0u64..200_000,
    ) {
        let (reg, id) = open(0, duration, rate);
        prop_assert_eq!(reg.balance_of(id, &sender(), Timestamp::new(now)).unwrap(), 0);
    }
}
