//! Forward and inverse delegation maps.

use crate::error::DelegationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ubi_types::Address;

/// What the delegator looks like at the moment it calls `delegate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelegatorContext {
    /// Oracle answer for the delegator.
    pub eligible: bool,
    /// Own units the delegator could hand over if it is self-accruing.
    pub own_units: u64,
    /// Streams the delegator sponsors whose window has not ended.
    pub active_streams: usize,
}

/// A validated `delegate` transition.
///
/// One unit of factor leaves `releasing` and lands on `accruing`. Both
/// endpoints must be consolidated before the factor moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationPlan {
    pub delegator: Address,
    /// The delegate being replaced, if any.
    pub previous: Option<Address>,
    /// The delegate being installed, if any.
    pub new_delegate: Option<Address>,
    /// Loses the unit: the previous delegate, or the delegator itself.
    pub releasing: Address,
    /// Gains the unit: the new delegate, or the delegator itself.
    pub accruing: Address,
}

/// The delegation graph.
///
/// `delegate_of[A] = B` means A's accruing unit is counted on B;
/// `inverse_delegate_of[B] = A` is the back-reference. Both maps are only
/// mutated together through [`DelegationGraph::apply`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationGraph {
    delegate_of: HashMap<Address, Address>,
    inverse_delegate_of: HashMap<Address, Address>,
}

impl DelegationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The account `delegator` redirects its accrual to.
    pub fn delegate_of(&self, delegator: &Address) -> Option<&Address> {
        self.delegate_of.get(delegator)
    }

    /// The account that redirects its accrual to `delegate`.
    pub fn inverse_delegate_of(&self, delegate: &Address) -> Option<&Address> {
        self.inverse_delegate_of.get(delegate)
    }

    pub fn is_delegating(&self, account: &Address) -> bool {
        self.delegate_of.contains_key(account)
    }

    /// Number of inbound units counted on `account` (0 or 1).
    pub fn inbound(&self, account: &Address) -> u64 {
        u64::from(self.inverse_delegate_of.contains_key(account))
    }

    /// Number of delegation edges.
    pub fn len(&self) -> usize {
        self.delegate_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegate_of.is_empty()
    }

    /// Check a `delegate(new_delegate)` call by `delegator`.
    ///
    /// `None` clears the current delegation. Nothing is mutated.
    pub fn validate(
        &self,
        delegator: &Address,
        new_delegate: Option<&Address>,
        ctx: DelegatorContext,
    ) -> Result<DelegationPlan, DelegationError> {
        if !ctx.eligible {
            return Err(DelegationError::NotEligible(delegator.to_string()));
        }
        let previous = self.delegate_of(delegator);
        if previous == new_delegate {
            return Err(DelegationError::Unchanged(delegator.to_string()));
        }
        if let Some(target) = new_delegate {
            if target == delegator {
                return Err(DelegationError::SelfDelegation);
            }
            if self.delegate_of(target) == Some(delegator) {
                return Err(DelegationError::MutualDelegation {
                    delegator: delegator.to_string(),
                    delegate: target.to_string(),
                });
            }
            if let Some(by) = self.inverse_delegate_of(target) {
                return Err(DelegationError::DelegateTaken {
                    delegate: target.to_string(),
                    by: by.to_string(),
                });
            }
        }
        if ctx.active_streams > 0 {
            return Err(DelegationError::ActiveStreams {
                delegator: delegator.to_string(),
                count: ctx.active_streams,
            });
        }
        if previous.is_none() && ctx.own_units == 0 {
            return Err(DelegationError::NothingToDelegate(delegator.to_string()));
        }

        let releasing = previous.unwrap_or(delegator).clone();
        let accruing = new_delegate.unwrap_or(delegator).clone();
        Ok(DelegationPlan {
            delegator: delegator.clone(),
            previous: previous.cloned(),
            new_delegate: new_delegate.cloned(),
            releasing,
            accruing,
        })
    }

    /// Record a validated transition in both maps.
    pub fn apply(&mut self, plan: &DelegationPlan) {
        if let Some(previous) = &plan.previous {
            self.inverse_delegate_of.remove(previous);
        }
        match &plan.new_delegate {
            Some(target) => {
                self.delegate_of.insert(plan.delegator.clone(), target.clone());
                self.inverse_delegate_of
                    .insert(target.clone(), plan.delegator.clone());
            }
            None => {
                self.delegate_of.remove(&plan.delegator);
            }
        }
    }

    /// Iterate over `(delegator, delegate)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (&Address, &Address)> {
        self.delegate_of.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> Address {
        Address::new(format!("ubi_{name}"))
    }

    fn eligible() -> DelegatorContext {
        DelegatorContext {
            eligible: true,
            own_units: 1,
            active_streams: 0,
        }
    }

    fn delegate(graph: &mut DelegationGraph, from: &Address, to: Option<&Address>) {
        let plan = graph.validate(from, to, eligible()).unwrap();
        graph.apply(&plan);
    }

    #[test]
    fn first_delegation_moves_unit_from_self() {
        let graph = DelegationGraph::new();
        let (a, b) = (addr("a"), addr("b"));
        let plan = graph.validate(&a, Some(&b), eligible()).unwrap();
        assert_eq!(plan.releasing, a);
        assert_eq!(plan.accruing, b);
        assert_eq!(plan.previous, None);
    }

    #[test]
    fn apply_updates_both_maps() {
        let mut graph = DelegationGraph::new();
        let (a, b) = (addr("a"), addr("b"));
        delegate(&mut graph, &a, Some(&b));
        assert_eq!(graph.delegate_of(&a), Some(&b));
        assert_eq!(graph.inverse_delegate_of(&b), Some(&a));
        assert_eq!(graph.inbound(&b), 1);
        assert!(graph.is_delegating(&a));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn redelegation_releases_previous_delegate() {
        let mut graph = DelegationGraph::new();
        let (a, b, c) = (addr("a"), addr("b"), addr("c"));
        delegate(&mut graph, &a, Some(&b));
        let plan = graph.validate(&a, Some(&c), eligible()).unwrap();
        assert_eq!(plan.releasing, b);
        assert_eq!(plan.accruing, c);
        graph.apply(&plan);
        assert_eq!(graph.inverse_delegate_of(&b), None);
        assert_eq!(graph.inverse_delegate_of(&c), Some(&a));
    }

    #[test]
    fn clearing_returns_unit_to_self() {
        let mut graph = DelegationGraph::new();
        let (a, b) = (addr("a"), addr("b"));
        delegate(&mut graph, &a, Some(&b));
        let plan = graph.validate(&a, None, eligible()).unwrap();
        assert_eq!(plan.releasing, b);
        assert_eq!(plan.accruing, a);
        graph.apply(&plan);
        assert!(graph.is_empty());
        assert_eq!(graph.inbound(&b), 0);
    }

    #[test]
    fn rejects_ineligible() {
        let graph = DelegationGraph::new();
        let ctx = DelegatorContext {
            eligible: false,
            ..eligible()
        };
        let err = graph.validate(&addr("a"), Some(&addr("b")), ctx).unwrap_err();
        assert!(matches!(err, DelegationError::NotEligible(_)));
    }

    #[test]
    fn rejects_unchanged() {
        let mut graph = DelegationGraph::new();
        let (a, b) = (addr("a"), addr("b"));
        assert!(matches!(
            graph.validate(&a, None, eligible()),
            Err(DelegationError::Unchanged(_))
        ));
        delegate(&mut graph, &a, Some(&b));
        assert!(matches!(
            graph.validate(&a, Some(&b), eligible()),
            Err(DelegationError::Unchanged(_))
        ));
    }

    #[test]
    fn rejects_self_and_mutual() {
        let mut graph = DelegationGraph::new();
        let (a, b) = (addr("a"), addr("b"));
        assert_eq!(
            graph.validate(&a, Some(&a), eligible()),
            Err(DelegationError::SelfDelegation)
        );
        delegate(&mut graph, &a, Some(&b));
        let err = graph.validate(&b, Some(&a), eligible()).unwrap_err();
        assert!(matches!(err, DelegationError::MutualDelegation { .. }));
        assert_eq!(err.kind(), ubi_types::ErrorKind::InvariantViolation);
    }

    #[test]
    fn rejects_second_inbound_edge() {
        let mut graph = DelegationGraph::new();
        let (a, b, c) = (addr("a"), addr("b"), addr("c"));
        delegate(&mut graph, &a, Some(&b));
        let err = graph.validate(&c, Some(&b), eligible()).unwrap_err();
        assert_eq!(
            err,
            DelegationError::DelegateTaken {
                delegate: b.to_string(),
                by: a.to_string()
            }
        );
    }

    #[test]
    fn allows_delegating_to_a_delegator() {
        let mut graph = DelegationGraph::new();
        let (a, b, c) = (addr("a"), addr("b"), addr("c"));
        delegate(&mut graph, &b, Some(&c));
        // A's unit lands on B only; it never follows B's edge to C.
        let plan = graph.validate(&a, Some(&b), eligible()).unwrap();
        assert_eq!(plan.accruing, b);
    }

    #[test]
    fn rejects_active_streams_and_empty_delegator() {
        let graph = DelegationGraph::new();
        let streaming = DelegatorContext {
            active_streams: 2,
            ..eligible()
        };
        assert!(matches!(
            graph.validate(&addr("a"), Some(&addr("b")), streaming),
            Err(DelegationError::ActiveStreams { count: 2, .. })
        ));
        let empty = DelegatorContext {
            own_units: 0,
            ..eligible()
        };
        assert!(matches!(
            graph.validate(&addr("a"), Some(&addr("b")), empty),
            Err(DelegationError::NothingToDelegate(_))
        ));
    }
}
