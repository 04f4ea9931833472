//! UBI ledger CLI: replay operation scripts against a fresh ledger.

mod script;

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use ubi_ledger::{LedgerConfig, UbiLedger};
use ubi_nullables::NullOracle;
use ubi_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "ubi-cli", about = "Continuously-accruing UBI ledger")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "UBI_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "UBI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "UBI_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON script of timestamped operations and print each outcome.
    Replay {
        /// JSON array of `{ "at": <secs>, "op": { "<name>": {...} } }` steps.
        #[arg(long)]
        script: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Replay { script } => {
            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps = script::parse(&raw)?;

            let oracle = NullOracle::new();
            let mut ledger = UbiLedger::from_config(&config, oracle.clone());
            tracing::info!(
                steps = steps.len(),
                symbol = ledger.symbol(),
                rate = %ledger.params().accrual_rate,
                "replaying script {}",
                script.display()
            );

            let outcomes = script::replay(&mut ledger, &oracle, &steps);
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for outcome in &outcomes {
                writeln!(out, "{}", serde_json::to_string(outcome)?)?;
            }

            let span = match (steps.first(), steps.last()) {
                (Some(first), Some(last)) => last.at.saturating_sub(first.at),
                _ => 0,
            };
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
            tracing::info!(
                failed,
                total_supply = %ledger.total_supply(),
                "replay finished, {} of ledger time",
                format_duration(span)
            );
        }
    }
    Ok(())
}
