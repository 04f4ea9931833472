//! Stream entry points.

use tracing::info;
use ubi_stream::{CreateStream, SenderContext, StreamId};
use ubi_types::{Address, Timestamp};

use crate::error::{LedgerError, LogRejection};
use crate::event::LedgerEvent;
use crate::ledger::UbiLedger;

impl UbiLedger {
    /// Open a stream from `caller` and return its id.
    ///
    /// The caller must be accruing its own unit, and the new rate plus the
    /// rates of its streams that have not ended may not exceed one
    /// identity's accrual rate.
    pub fn create_stream(
        &mut self,
        caller: &Address,
        params: &CreateStream,
        now: Timestamp,
    ) -> Result<StreamId, LedgerError> {
        let ctx = SenderContext {
            eligible: self.is_eligible(caller),
            accruing: self.factor_split(caller).own > 0,
            own_rate: self.accrual.rate(),
        };
        let plan = self
            .check_time(now)
            .and_then(|_| {
                self.streams.validate_create(
                    caller,
                    params,
                    ctx,
                    &self.params.ledger_address,
                    now,
                )?;
                let plan = self.plan_consolidation(caller, now)?;
                self.supply_after(&[&plan], 0, 0)?;
                Ok(plan)
            })
            .log_rejection("create_stream")?;

        self.apply_consolidation(&plan, now)?;
        let ledger_address = self.params.ledger_address.clone();
        let stream_id = self
            .streams
            .create(caller, params, ctx, &ledger_address, now)?;
        self.advance(now);

        info!(
            stream_id,
            sender = %caller,
            recipient = %params.recipient,
            rate = %params.rate_per_second,
            start = params.start_time.as_secs(),
            stop = params.stop_time.as_secs(),
            "stream created"
        );
        self.emit(LedgerEvent::StreamCreated {
            stream_id,
            sender: caller.clone(),
            recipient: params.recipient.clone(),
            asset: params.asset.clone(),
            start_time: params.start_time,
            stop_time: params.stop_time,
            rate_per_second: params.rate_per_second,
            interval: params.interval,
        });
        Ok(stream_id)
    }

    /// Move `amount` out of stream `id` into the recipient's principal.
    pub fn withdraw_from_stream(
        &mut self,
        caller: &Address,
        id: StreamId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let plan = self
            .check_time(now)
            .and_then(|_| {
                self.streams.validate_withdraw(id, caller, amount, now)?;
                let plan = self.plan_consolidation(caller, now)?;
                self.supply_after(&[&plan], amount, 0)?;
                Ok(plan)
            })
            .log_rejection("withdraw_from_stream")?;

        self.apply_consolidation(&plan, now)?;
        self.streams.withdraw(id, caller, amount, now)?;
        self.book.mint(caller, amount)?;
        self.advance(now);

        info!(stream_id = id, recipient = %caller, amount = %amount, "stream withdrawn");
        self.emit(LedgerEvent::StreamWithdrawn {
            stream_id: id,
            recipient: caller.clone(),
            amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LedgerConfig;
    use crate::ledger::UbiLedger;
    use ubi_nullables::NullOracle;
    use ubi_stream::CreateStream;
    use ubi_types::{Address, ErrorKind, Timestamp};

    fn addr(name: &str) -> Address {
        Address::new(format!("ubi_{name}"))
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn setup() -> (UbiLedger, NullOracle) {
        let oracle = NullOracle::with_eligible([&addr("alice")]);
        let config = LedgerConfig {
            accrual_rate: 10,
            ..LedgerConfig::default()
        };
        let mut ledger = UbiLedger::from_config(&config, oracle.clone());
        ledger
            .start_accruing(&addr("alice"), &addr("alice"), t(0))
            .unwrap();
        (ledger, oracle)
    }

    fn to(ledger: &UbiLedger, recipient: &str, start: u64, stop: u64, rate: u128) -> CreateStream {
        CreateStream {
            recipient: addr(recipient),
            asset: ledger.params().ledger_address.clone(),
            start_time: t(start),
            stop_time: t(stop),
            rate_per_second: rate,
            interval: 1,
        }
    }

    #[test]
    fn stream_draws_from_sender_balance() {
        let (mut ledger, _) = setup();
        let alice = addr("alice");
        let params = to(&ledger, "carol", 100, 200, 4);
        let id = ledger.create_stream(&alice, &params, t(100)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(ledger.principal(&alice), 1000);

        assert_eq!(ledger.balance_of(&alice, t(150)), 1000 + 500 - 200);
        assert_eq!(ledger.stream_balance_of(id, &addr("carol"), t(150)).unwrap(), 200);
        // After the window: sender keeps accruing, stream is frozen at 400.
        assert_eq!(ledger.balance_of(&alice, t(300)), 3000 - 400);
    }

    #[test]
    fn withdrawal_credits_recipient() {
        let (mut ledger, _) = setup();
        let (alice, carol) = (addr("alice"), addr("carol"));
        let id = ledger
            .create_stream(&alice, &to(&ledger, "carol", 0, 100, 5), t(0))
            .unwrap();
        ledger.withdraw_from_stream(&carol, id, 120, t(30)).unwrap();
        assert_eq!(ledger.principal(&carol), 120);
        assert_eq!(ledger.stream_balance_of(id, &carol, t(30)).unwrap(), 30);

        let err = ledger.withdraw_from_stream(&carol, id, 31, t(30)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        let err = ledger.withdraw_from_stream(&alice, id, 1, t(30)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = ledger.withdraw_from_stream(&carol, id, 0, t(30)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn creation_preconditions() {
        let (mut ledger, _) = setup();
        let alice = addr("alice");

        let too_fast = to(&ledger, "carol", 0, 100, 11);
        let err = ledger.create_stream(&alice, &too_fast, t(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        let mut foreign = to(&ledger, "carol", 0, 100, 1);
        foreign.asset = addr("other");
        let err = ledger.create_stream(&alice, &foreign, t(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let bob = addr("bob");
        let err = ledger
            .create_stream(&bob, &to(&ledger, "carol", 0, 100, 1), t(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eligibility);

        ledger
            .create_stream(&alice, &to(&ledger, "carol", 0, 100, 6), t(0))
            .unwrap();
        let err = ledger
            .create_stream(&alice, &to(&ledger, "carol", 10, 20, 1), t(10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        let err = ledger
            .create_stream(&alice, &to(&ledger, "dave", 10, 20, 5), t(10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(ledger.stream_count(), 1);
    }

    #[test]
    fn delegating_while_streaming_is_rejected() {
        let (mut ledger, _) = setup();
        let alice = addr("alice");
        ledger
            .create_stream(&alice, &to(&ledger, "carol", 0, 100, 1), t(0))
            .unwrap();
        let err = ledger.delegate(&alice, Some(&addr("bob")), t(50)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        ledger.delegate(&alice, Some(&addr("bob")), t(100)).unwrap();

        // Delegating away leaves no own unit to stream from.
        let err = ledger
            .create_stream(&alice, &to(&ledger, "dave", 100, 200, 1), t(100))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn empty_future_window_does_not_block_delegation() {
        let (mut ledger, _) = setup();
        let alice = addr("alice");
        ledger
            .create_stream(&alice, &to(&ledger, "carol", 1000, 1000, 10), t(0))
            .unwrap();
        assert_eq!(ledger.stream_accrued(1, t(5000)).unwrap(), 0);
        ledger.delegate(&alice, Some(&addr("bob")), t(1)).unwrap();
        assert_eq!(ledger.delegate_of(&alice), Some(&addr("bob")));
    }

    #[test]
    fn empty_future_window_holds_no_rate_or_pair() {
        let (mut ledger, _) = setup();
        let alice = addr("alice");
        ledger
            .create_stream(&alice, &to(&ledger, "carol", 1000, 1000, 10), t(0))
            .unwrap();
        let id = ledger
            .create_stream(&alice, &to(&ledger, "carol", 1, 500, 10), t(1))
            .unwrap();
        assert_eq!(id, 2);
    }
}
