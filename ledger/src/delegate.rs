//! The `delegate` transition.

use tracing::info;
use ubi_delegation::DelegatorContext;
use ubi_types::{Address, Timestamp};

use crate::error::{LedgerError, LogRejection};
use crate::event::LedgerEvent;
use crate::ledger::UbiLedger;

impl UbiLedger {
    /// Redirect `caller`'s accruing unit to `new_delegate`, or back to
    /// `caller` itself with `None`.
    ///
    /// Exactly one unit of factor moves from the releasing account (the
    /// previous delegate, or the caller) to the accruing one (the new
    /// delegate, or the caller). Both are consolidated first; afterwards
    /// each clock runs from `now` while its account still holds a unit.
    pub fn delegate(
        &mut self,
        caller: &Address,
        new_delegate: Option<&Address>,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let (plan, releasing, accruing) = self
            .check_time(now)
            .and_then(|_| {
                let eligible = self.is_eligible(caller);
                let ctx = DelegatorContext {
                    eligible,
                    own_units: self.accrual.delegable_units(
                        caller,
                        eligible,
                        self.delegation.is_delegating(caller),
                        self.delegation.inbound(caller),
                    ),
                    active_streams: self.streams.active_count(caller, now),
                };
                let plan = self.delegation.validate(caller, new_delegate, ctx)?;
                let releasing = self.plan_consolidation(&plan.releasing, now)?;
                let accruing = self.plan_consolidation(&plan.accruing, now)?;
                self.supply_after(&[&releasing, &accruing], 0, 0)?;
                Ok((plan, releasing, accruing))
            })
            .log_rejection("delegate")?;

        self.apply_consolidation(&releasing, now)?;
        self.apply_consolidation(&accruing, now)?;
        let releasing_eligible = self.is_eligible(&plan.releasing);
        self.accrual
            .decrement_factor(&plan.releasing, releasing_eligible)?;
        self.accrual.increment_factor(&plan.accruing)?;
        self.delegation.apply(&plan);
        self.accrual.settle_clock(&plan.releasing, now);
        self.accrual.settle_clock(&plan.accruing, now);
        self.advance(now);

        info!(
            delegator = %caller,
            delegate = ?plan.new_delegate.as_ref().map(Address::as_str),
            releasing = %plan.releasing,
            accruing = %plan.accruing,
            at = now.as_secs(),
            "delegation changed"
        );
        self.emit(LedgerEvent::DelegationChanged {
            delegator: plan.delegator,
            delegate: plan.new_delegate,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LedgerConfig;
    use crate::ledger::UbiLedger;
    use ubi_nullables::NullOracle;
    use ubi_types::{Address, ErrorKind, Timestamp};

    fn addr(name: &str) -> Address {
        Address::new(format!("ubi_{name}"))
    }

    fn setup(eligible: &[&str]) -> (UbiLedger, NullOracle) {
        let oracle = NullOracle::new();
        for name in eligible {
            oracle.register(&addr(name));
        }
        let config = LedgerConfig {
            accrual_rate: 1,
            ..LedgerConfig::default()
        };
        (UbiLedger::from_config(&config, oracle.clone()), oracle)
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn delegation_moves_one_unit() {
        let (mut ledger, _) = setup(&["a", "b"]);
        let (a, b) = (addr("a"), addr("b"));
        ledger.start_accruing(&a, &a, t(0)).unwrap();
        ledger.start_accruing(&b, &b, t(0)).unwrap();
        assert_eq!(ledger.total_factor(), 2);

        ledger.delegate(&a, Some(&b), t(100)).unwrap();
        assert_eq!(ledger.accruing_factor(&a), 0);
        assert_eq!(ledger.accruing_factor(&b), 2);
        assert_eq!(ledger.total_factor(), 2);
        assert_eq!(ledger.delegate_of(&a), Some(&b));
        assert_eq!(ledger.inverse_delegate_of(&b), Some(&a));

        // Both accrued 100 before the move and were realized by it.
        assert_eq!(ledger.principal(&a), 100);
        assert_eq!(ledger.principal(&b), 100);
        assert_eq!(ledger.accrued_since(&a), None);
        assert_eq!(ledger.balance_of(&a, t(200)), 100);
        assert_eq!(ledger.balance_of(&b, t(200)), 300);
    }

    #[test]
    fn clearing_restores_the_delegator() {
        let (mut ledger, _) = setup(&["a", "b"]);
        let (a, b) = (addr("a"), addr("b"));
        ledger.start_accruing(&a, &a, t(0)).unwrap();
        ledger.delegate(&a, Some(&b), t(0)).unwrap();
        ledger.delegate(&a, None, t(50)).unwrap();

        assert_eq!(ledger.accruing_factor(&a), 1);
        assert_eq!(ledger.accruing_factor(&b), 0);
        assert_eq!(ledger.delegate_of(&a), None);
        assert_eq!(ledger.inverse_delegate_of(&b), None);
        assert_eq!(ledger.accrued_since(&a), Some(t(50)));
        assert_eq!(ledger.accrued_since(&b), None);
        assert_eq!(ledger.balance_of(&b, t(80)), 50);
        assert_eq!(ledger.balance_of(&a, t(80)), 30);
    }

    #[test]
    fn redelegation_moves_the_unit_between_delegates() {
        let (mut ledger, _) = setup(&["a"]);
        let (a, b, c) = (addr("a"), addr("b"), addr("c"));
        ledger.start_accruing(&a, &a, t(0)).unwrap();
        ledger.delegate(&a, Some(&b), t(0)).unwrap();
        ledger.delegate(&a, Some(&c), t(10)).unwrap();
        assert_eq!(ledger.accruing_factor(&b), 0);
        assert_eq!(ledger.accruing_factor(&c), 1);
        assert_eq!(ledger.principal(&b), 10);
        assert_eq!(ledger.balance_of(&c, t(25)), 15);
        assert_eq!(ledger.total_factor(), 1);
    }

    #[test]
    fn rejections_leave_state_untouched() {
        let (mut ledger, oracle) = setup(&["a", "b", "c"]);
        let (a, b, c) = (addr("a"), addr("b"), addr("c"));
        ledger.start_accruing(&a, &a, t(0)).unwrap();
        ledger.start_accruing(&b, &b, t(0)).unwrap();
        ledger.delegate(&a, Some(&b), t(0)).unwrap();

        let cases = [
            (ledger.delegate(&a, Some(&b), t(5)), ErrorKind::StateConflict),
            (ledger.delegate(&b, Some(&a), t(5)), ErrorKind::InvariantViolation),
            (ledger.delegate(&b, Some(&b), t(5)), ErrorKind::InvariantViolation),
            (ledger.delegate(&c, Some(&b), t(5)), ErrorKind::StateConflict),
        ];
        for (result, kind) in cases {
            assert_eq!(result.unwrap_err().kind(), kind);
        }

        oracle.revoke(&c);
        let err = ledger.delegate(&c, Some(&a), t(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eligibility);

        assert_eq!(ledger.accruing_factor(&b), 2);
        assert_eq!(ledger.principal(&b), 0);
        assert_eq!(ledger.last_seen(), t(0));
    }

    #[test]
    fn never_started_account_delegates_its_implicit_unit() {
        let (mut ledger, _) = setup(&["a"]);
        let (a, b) = (addr("a"), addr("b"));
        assert_eq!(ledger.accruing_factor(&a), 1);

        ledger.delegate(&a, Some(&b), t(0)).unwrap();
        assert_eq!(ledger.accruing_factor(&a), 0);
        assert_eq!(ledger.accruing_factor(&b), 1);
        assert_eq!(ledger.total_factor(), 1);
        assert_eq!(ledger.balance_of(&b, t(3600)), 3600);
        assert_eq!(ledger.balance_of(&a, t(3600)), 0);

        // Clearing brings the unit home, running from the clear.
        ledger.delegate(&a, None, t(3600)).unwrap();
        assert_eq!(ledger.accruing_factor(&a), 1);
        assert_eq!(ledger.balance_of(&a, t(3700)), 100);
        assert_eq!(ledger.balance_of(&b, t(3700)), 3600);
    }

    #[test]
    fn removed_account_has_nothing_to_delegate() {
        let (mut ledger, oracle) = setup(&["a"]);
        let a = addr("a");
        ledger.start_accruing(&a, &a, t(0)).unwrap();
        oracle.revoke(&a);
        ledger.report_removal(&addr("r"), &a, t(10)).unwrap();
        oracle.register(&a);

        let err = ledger.delegate(&a, Some(&addr("b")), t(20)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(ledger.accruing_factor(&a), 0);
    }
}
