//! Offline planning CLI
//!
//! Computes deposit plans and withdrawal share amounts from reserves given
//! on the command line, without touching any chain.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use serde_json::json;
use std::path::PathBuf;
use tidepool_amm::{withdrawal_amount, BasisPoints, PoolReserves};
use tidepool_config::defaults::{DEFAULT_DEADLINE_OFFSET_SECS, DEFAULT_LOG_LEVEL};
use tidepool_config::ProvisionConfig;
use tidepool_provision::clock::{Clock, SystemClock};
use tidepool_provision::{build_deposit_batch, plan_deposit};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tidepool", version, about = "Plan liquidity deposits and withdrawals")]
struct Cli {
    /// Provisioning config file; only logging and deadline settings are used
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Environment overlay applied on top of the config file
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size the swap and deposit for an unbalanced pair of amounts
    Plan {
        #[arg(long, value_parser = parse_u256)]
        reference_reserve: U256,
        #[arg(long, value_parser = parse_u256)]
        token_reserve: U256,
        #[arg(long, value_parser = parse_u256)]
        reference_amount: U256,
        #[arg(long, value_parser = parse_u256)]
        token_amount: U256,
        /// Trim the excess side instead of swapping it
        #[arg(long)]
        prevent_swap: bool,
    },
    /// Shares redeemed for a fraction of a position
    WithdrawAmount {
        #[arg(long, value_parser = parse_u256)]
        shares: U256,
        /// Fraction in basis points, 0 to 10000
        #[arg(long)]
        bps: u32,
    },
}

fn parse_u256(raw: &str) -> std::result::Result<U256, String> {
    U256::from_dec_str(raw).map_err(|e| format!("invalid amount {:?}: {}", raw, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (log_level, deadline_offset) = match &cli.config {
        Some(path) => {
            let config = ProvisionConfig::load(Some(path.as_path()), cli.env.as_deref())?;
            (config.log_level, config.deadline_offset_secs)
        }
        None => (DEFAULT_LOG_LEVEL.to_string(), DEFAULT_DEADLINE_OFFSET_SECS),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Command::Plan {
            reference_reserve,
            token_reserve,
            reference_amount,
            token_amount,
            prevent_swap,
        } => {
            info!("🏊 Planning deposit against {} / {}", reference_reserve, token_reserve);
            let reserves = PoolReserves::new(reference_reserve, token_reserve);
            let allocation = plan_deposit(reserves, reference_amount, token_amount, prevent_swap)
                .context("deposit planning failed")?;
            let deadline = U256::from(SystemClock.now()) + U256::from(deadline_offset);
            let plan = build_deposit_batch(Address::zero(), Address::zero(), &allocation, deadline)
                .context("deposit batch construction failed")?;

            json!({
                "excess": format!("{:?}", allocation.excess),
                "swap_amount": allocation.swap_amount.to_string(),
                "swap_output": allocation.swap_output.to_string(),
                "reference_deposit": plan.reference_deposit.to_string(),
                "token_deposit": plan.token_deposit.to_string(),
                "calls": plan.batch.call_names(),
            })
        }
        Command::WithdrawAmount { shares, bps } => {
            let fraction = BasisPoints::new(bps).context("invalid withdrawal fraction")?;
            let amount = withdrawal_amount(shares, fraction).context("withdrawal sizing failed")?;
            json!({
                "share_balance": shares.to_string(),
                "fraction_bps": fraction.get(),
                "shares_redeemed": amount.to_string(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
