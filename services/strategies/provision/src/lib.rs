//! # Tidepool Provisioning Service
//!
//! ## Purpose
//!
//! Deposits a wallet's assets into reference-asset constant-product pools and
//! withdraws them again. An unbalanced deposit is rebalanced with one swap
//! (or trimmed when swaps are disallowed) before the liquidity call, and
//! every step is handed to the custody wallet as a single atomic batch.
//!
//! ## Integration Points
//!
//! - **Pool discovery**: [`PoolRegistry`]
//! - **Balances and supplies**: [`AssetLedger`]
//! - **Execution**: [`Wallet`], one [`CallBatch`] per operation
//! - **Strategy contract**: [`YieldStrategy`]
//!
//! ## Architecture Role
//!
//! ```text
//! DepositRequest ──┐                         ┌─► PoolRegistry
//!                  ├─► LiquidityProvisioner ─┼─► AssetLedger
//! WithdrawalRequest┘          │              └─► Wallet::execute(CallBatch)
//!                             └─► tidepool_amm (allocation, withdrawal sizing)
//! ```

pub mod calls;
pub mod clock;
pub mod collaborators;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod provisioner;
pub mod request;
pub mod strategy;
pub mod testing;

pub use calls::{CallBatch, Invocation, PoolCall};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{AssetLedger, PoolRegistry, Wallet};
pub use error::{CollaboratorError, ProvisionError, Result};
pub use metrics::{MetricsCollector, StrategyMetrics};
pub use provisioner::{
    build_deposit_batch, plan_deposit, DepositPlan, DepositReceipt, LiquidityProvisioner, SwapLeg,
    WithdrawalReceipt,
};
pub use request::{AssetPair, DepositRequest, ResolvedDeposit, WithdrawalRequest};
pub use strategy::YieldStrategy;
