//! Operation scripts: parsing and replay.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use ubi_ledger::{Address, CreateStream, LedgerError, Timestamp, UbiLedger};
use ubi_nullables::NullOracle;

fn default_interval() -> u64 {
    1
}

/// One timestamped operation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Host time in seconds.
    pub at: u64,
    pub op: Op,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Mark an account eligible in the replay oracle.
    Register { account: Address },
    /// Mark an account ineligible in the replay oracle.
    Revoke { account: Address },
    StartAccruing { caller: Address, account: Address },
    ReportRemoval { caller: Address, account: Address },
    Delegate {
        caller: Address,
        #[serde(default)]
        delegate: Option<Address>,
    },
    CreateStream {
        caller: Address,
        recipient: Address,
        /// Defaults to the ledger's own address.
        #[serde(default)]
        asset: Option<Address>,
        start_time: u64,
        stop_time: u64,
        rate_per_second: u128,
        #[serde(default = "default_interval")]
        interval: u64,
    },
    Withdraw {
        caller: Address,
        stream_id: u64,
        amount: u128,
    },
    Transfer {
        caller: Address,
        to: Address,
        amount: u128,
    },
    TransferFrom {
        caller: Address,
        owner: Address,
        to: Address,
        amount: u128,
    },
    Approve {
        caller: Address,
        spender: Address,
        amount: u128,
    },
    IncreaseAllowance {
        caller: Address,
        spender: Address,
        amount: u128,
    },
    DecreaseAllowance {
        caller: Address,
        spender: Address,
        amount: u128,
    },
    Burn { caller: Address, amount: u128 },
    BurnFrom {
        caller: Address,
        owner: Address,
        amount: u128,
    },
    /// Print resolved balances of the listed accounts.
    Balances { accounts: Vec<Address> },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Revoke { .. } => "revoke",
            Self::StartAccruing { .. } => "start_accruing",
            Self::ReportRemoval { .. } => "report_removal",
            Self::Delegate { .. } => "delegate",
            Self::CreateStream { .. } => "create_stream",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Approve { .. } => "approve",
            Self::IncreaseAllowance { .. } => "increase_allowance",
            Self::DecreaseAllowance { .. } => "decrease_allowance",
            Self::Burn { .. } => "burn",
            Self::BurnFrom { .. } => "burn_from",
            Self::Balances { .. } => "balances",
        }
    }
}

/// What a step did. Amounts are decimal strings so they survive any JSON
/// reader.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub at: u64,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balances: Option<BTreeMap<String, String>>,
}

pub fn parse(raw: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_json::from_str(raw)?)
}

/// Apply every step in order. A rejected step is reported in its outcome
/// and does not stop the replay.
pub fn replay(ledger: &mut UbiLedger, oracle: &NullOracle, steps: &[Step]) -> Vec<Outcome> {
    steps
        .iter()
        .map(|step| {
            let mut outcome = Outcome {
                at: step.at,
                op: step.op.name(),
                ..Outcome::default()
            };
            if let Err(e) = apply(ledger, oracle, step, &mut outcome) {
                warn!(at = step.at, op = outcome.op, error = %e, "step rejected");
                outcome.kind = Some(e.kind().as_str());
                outcome.error = Some(e.to_string());
            }
            outcome
        })
        .collect()
}

fn apply(
    ledger: &mut UbiLedger,
    oracle: &NullOracle,
    step: &Step,
    outcome: &mut Outcome,
) -> Result<(), LedgerError> {
    let now = Timestamp::new(step.at);
    match &step.op {
        Op::Register { account } => oracle.register(account),
        Op::Revoke { account } => oracle.revoke(account),
        Op::StartAccruing { caller, account } => ledger.start_accruing(caller, account, now)?,
        Op::ReportRemoval { caller, account } => {
            let bounty = ledger.report_removal(caller, account, now)?;
            outcome.bounty = Some(bounty.to_string());
        }
        Op::Delegate { caller, delegate } => ledger.delegate(caller, delegate.as_ref(), now)?,
        Op::CreateStream {
            caller,
            recipient,
            asset,
            start_time,
            stop_time,
            rate_per_second,
            interval,
        } => {
            let params = CreateStream {
                recipient: recipient.clone(),
                asset: asset
                    .clone()
                    .unwrap_or_else(|| ledger.params().ledger_address.clone()),
                start_time: Timestamp::new(*start_time),
                stop_time: Timestamp::new(*stop_time),
                rate_per_second: *rate_per_second,
                interval: *interval,
            };
            outcome.stream_id = Some(ledger.create_stream(caller, &params, now)?);
        }
        Op::Withdraw {
            caller,
            stream_id,
            amount,
        } => ledger.withdraw_from_stream(caller, *stream_id, *amount, now)?,
        Op::Transfer { caller, to, amount } => ledger.transfer(caller, to, *amount, now)?,
        Op::TransferFrom {
            caller,
            owner,
            to,
            amount,
        } => ledger.transfer_from(caller, owner, to, *amount, now)?,
        Op::Approve {
            caller,
            spender,
            amount,
        } => ledger.approve(caller, spender, *amount, now)?,
        Op::IncreaseAllowance {
            caller,
            spender,
            amount,
        } => ledger.increase_allowance(caller, spender, *amount, now)?,
        Op::DecreaseAllowance {
            caller,
            spender,
            amount,
        } => ledger.decrease_allowance(caller, spender, *amount, now)?,
        Op::Burn { caller, amount } => ledger.burn(caller, *amount, now)?,
        Op::BurnFrom {
            caller,
            owner,
            amount,
        } => ledger.burn_from(caller, owner, *amount, now)?,
        Op::Balances { accounts } => {
            let balances = accounts
                .iter()
                .map(|a| (a.to_string(), ledger.balance_of(a, now).to_string()))
                .collect();
            outcome.balances = Some(balances);
        }
    }
    Ok(())
}
