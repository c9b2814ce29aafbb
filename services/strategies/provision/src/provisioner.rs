//! # Liquidity Provisioner - Deposit and Withdrawal Orchestration
//!
//! ## Purpose
//!
//! Turns a caller's deposit or withdrawal request into the ordered calls the
//! custody wallet executes against a reference-asset pool. Deposits are
//! rebalanced through a single swap (or trimmed when swaps are disallowed) so
//! the final deposit matches the pool ratio without spending more than was
//! supplied.
//!
//! ## Execution Flow
//!
//! ```text
//! DepositRequest ─► resolve pair ─► balance checks ─► registry lookup ─► reserve snapshot
//!                                                                           │
//!                  Wallet::execute ◄── CallBatch ◄── build_deposit_batch ◄── plan_deposit
//!
//! WithdrawalRequest ─► registry lookup ─► share balance ─► withdrawal_amount ─► removeLiquidity
//! ```
//!
//! Reserves are read once per operation. They may move before the wallet
//! executes the batch; the only protection is the floor of one unit on every
//! swap, deposit and withdrawal, plus the short deadline.

use crate::calls::{CallBatch, Invocation, PoolCall};
use crate::clock::{Clock, SystemClock};
use crate::collaborators::{AssetLedger, PoolRegistry, Wallet};
use crate::error::{ProvisionError, Result};
use crate::logging::LogEmoji;
use crate::metrics::{MetricsCollector, StrategyMetrics};
use crate::request::{DepositRequest, WithdrawalRequest};
use crate::{log_deposit, log_failure, log_swap, log_withdraw};
use ethers::types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;
use tidepool_amm::{
    allocate, checked, withdrawal_amount, Allocation, Excess, PoolReserves, SwapDirection,
};
use tidepool_config::defaults::{MIN_OUTPUT_FLOOR, MIN_SHARE_FLOOR, REFERENCE_DEPOSIT_ADJUSTMENT};
use tidepool_config::ProvisionConfig;
use tracing::{debug, info};

/// The conversion issued before a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapLeg {
    pub direction: SwapDirection,
    pub amount_in: U256,
    /// Output expected at the snapshotted reserves
    pub expected_output: U256,
    pub min_output: U256,
}

/// Calls and amounts for one deposit, before execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositPlan {
    pub allocation: Allocation,
    pub swap: Option<SwapLeg>,
    /// Reference asset sent with the deposit call
    pub reference_deposit: U256,
    /// Token amount the pool may pull
    pub token_deposit: U256,
    pub batch: CallBatch,
}

/// Outcome of an executed deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositReceipt {
    pub pool: Address,
    pub token: Address,
    pub reserves: PoolReserves,
    pub plan: DepositPlan,
}

impl DepositReceipt {
    pub fn reference_deposited(&self) -> U256 {
        self.plan.reference_deposit
    }

    pub fn token_deposited(&self) -> U256 {
        self.plan.token_deposit
    }
}

/// Outcome of an executed withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalReceipt {
    pub pool: Address,
    pub token: Address,
    pub share_balance: U256,
    pub shares_redeemed: U256,
    /// Reference asset expected back at the snapshotted reserves
    pub expected_reference: U256,
    /// Token expected back at the snapshotted reserves
    pub expected_token: U256,
    pub batch: CallBatch,
}

/// Allocate a deposit of `(reference_amount, token_amount)` against `reserves`
pub fn plan_deposit(
    reserves: PoolReserves,
    reference_amount: U256,
    token_amount: U256,
    prevent_swap: bool,
) -> Result<Allocation> {
    if reserves.is_degenerate() {
        return Err(ProvisionError::DegeneratePool {
            reserve_in: reserves.reference,
            reserve_out: reserves.token,
        });
    }
    Ok(allocate(
        reserves.reference,
        reserves.token,
        reference_amount,
        token_amount,
        prevent_swap,
    )?)
}

/// Order the calls for an allocated deposit
///
/// Reference asset in excess: optional reference→token swap, then approve
/// the token deposit. Token in excess: approve swap input plus deposit, then
/// the optional token→reference swap. Both finish with `addLiquidity`,
/// sending one unit less reference asset than allocated.
pub fn build_deposit_batch(
    pool: Address,
    token: Address,
    allocation: &Allocation,
    deadline: U256,
) -> Result<DepositPlan> {
    let floor = U256::from(MIN_OUTPUT_FLOOR);
    let token_deposit = allocation.second_deposit;
    let mut batch = CallBatch::new();
    let mut swap = None;

    match allocation.excess {
        Excess::First => {
            if !allocation.swap_amount.is_zero() {
                batch.push(Invocation::with_value(
                    pool,
                    allocation.swap_amount,
                    PoolCall::EthToTokenSwapInput {
                        min_tokens: floor,
                        deadline,
                    },
                ));
                swap = Some(SwapLeg {
                    direction: SwapDirection::ReferenceToToken,
                    amount_in: allocation.swap_amount,
                    expected_output: allocation.swap_output,
                    min_output: floor,
                });
            }
            batch.push(Invocation::new(
                token,
                PoolCall::Approve {
                    spender: pool,
                    amount: token_deposit,
                },
            ));
        }
        Excess::Second => {
            let allowance = checked::add(allocation.swap_amount, token_deposit, "token allowance")?;
            batch.push(Invocation::new(
                token,
                PoolCall::Approve {
                    spender: pool,
                    amount: allowance,
                },
            ));
            if !allocation.swap_amount.is_zero() {
                batch.push(Invocation::new(
                    pool,
                    PoolCall::TokenToEthSwapInput {
                        tokens_sold: allocation.swap_amount,
                        min_eth: floor,
                        deadline,
                    },
                ));
                swap = Some(SwapLeg {
                    direction: SwapDirection::TokenToReference,
                    amount_in: allocation.swap_amount,
                    expected_output: allocation.swap_output,
                    min_output: floor,
                });
            }
        }
    }

    let reference_deposit = checked::sub(
        allocation.first_deposit,
        U256::from(REFERENCE_DEPOSIT_ADJUSTMENT),
        "reference deposit adjustment",
    )?;
    batch.push(Invocation::with_value(
        pool,
        reference_deposit,
        PoolCall::AddLiquidity {
            min_liquidity: U256::from(MIN_SHARE_FLOOR),
            max_tokens: token_deposit,
            deadline,
        },
    ));

    Ok(DepositPlan {
        allocation: *allocation,
        swap,
        reference_deposit,
        token_deposit,
        batch,
    })
}

fn log_batch(operation: &str, batch: &CallBatch) {
    for (index, invocation) in batch.invocations().iter().enumerate() {
        debug!(
            operation,
            index,
            call = invocation.call.name(),
            to = ?invocation.target,
            value = %invocation.value,
            "Issuing {}",
            invocation
        );
    }
}

/// Orchestrates deposits into and withdrawals from reference-asset pools on
/// behalf of one custody wallet
pub struct LiquidityProvisioner {
    config: ProvisionConfig,
    registry: Arc<dyn PoolRegistry>,
    ledger: Arc<dyn AssetLedger>,
    wallet: Arc<dyn Wallet>,
    clock: Arc<dyn Clock>,
    metrics: MetricsCollector,
}

impl LiquidityProvisioner {
    pub fn new(
        config: ProvisionConfig,
        registry: Arc<dyn PoolRegistry>,
        ledger: Arc<dyn AssetLedger>,
        wallet: Arc<dyn Wallet>,
    ) -> Self {
        Self {
            config,
            registry,
            ledger,
            wallet,
            clock: Arc::new(SystemClock),
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    pub fn metrics(&self) -> StrategyMetrics {
        self.metrics.get_metrics()
    }

    /// Rebalance and deposit the requested amounts
    pub async fn add_liquidity(&self, request: &DepositRequest) -> Result<DepositReceipt> {
        let result = self.execute_deposit(request).await;
        match &result {
            Ok(receipt) => {
                self.metrics.increment_opened();
                if receipt.plan.swap.is_some() {
                    self.metrics.increment_swaps();
                }
            }
            Err(e) => {
                self.metrics.increment_failures();
                log_failure!("Deposit rejected: {}", e);
            }
        }
        result
    }

    /// Redeem a fraction of the wallet's pool shares
    pub async fn remove_liquidity(&self, request: &WithdrawalRequest) -> Result<WithdrawalReceipt> {
        let result = self.execute_withdrawal(request).await;
        match &result {
            Ok(_) => self.metrics.increment_closed(),
            Err(e) => {
                self.metrics.increment_failures();
                log_failure!("Withdrawal rejected: {}", e);
            }
        }
        result
    }

    /// Value of the wallet's position in `token`'s pool, expressed in token
    /// units: `shares * token_reserve * 2 / total_shares`
    pub async fn position_value(&self, token: Address) -> Result<U256> {
        let pool = self.resolve_pool(token).await?;
        let shares = self.ledger.balance_of(pool, self.config.wallet).await?;
        if shares.is_zero() {
            return Ok(U256::zero());
        }
        let total_shares = self.ledger.total_supply(pool).await?;
        if total_shares.is_zero() {
            return Ok(U256::zero());
        }
        let token_reserve = self.ledger.balance_of(token, pool).await?;

        let doubled = checked::mul(
            checked::mul(shares, token_reserve, "position value")?,
            U256::from(2u8),
            "position value",
        )?;
        Ok(checked::div(doubled, total_shares, "position value")?)
    }

    async fn execute_deposit(&self, request: &DepositRequest) -> Result<DepositReceipt> {
        let deposit = request.resolve(self.config.reference_asset)?;
        if deposit.reference_amount.is_zero() && deposit.token_amount.is_zero() {
            return Err(ProvisionError::invalid_input("nothing to deposit"));
        }

        info!(
            token = ?deposit.token,
            reference_amount = %deposit.reference_amount,
            token_amount = %deposit.token_amount,
            prevent_swap = deposit.prevent_swap,
            "Planning deposit"
        );

        self.ensure_balance(self.config.reference_asset, deposit.reference_amount)
            .await?;
        self.ensure_balance(deposit.token, deposit.token_amount).await?;

        let pool = self.resolve_pool(deposit.token).await?;
        let reserves = self.snapshot_reserves(pool, deposit.token).await?;

        let allocation = plan_deposit(
            reserves,
            deposit.reference_amount,
            deposit.token_amount,
            deposit.prevent_swap,
        )?;
        let plan = build_deposit_batch(pool, deposit.token, &allocation, self.deadline())?;
        log_batch("deposit", &plan.batch);

        if let Some(leg) = &plan.swap {
            log_swap!(
                "Swapping {} {:?} (expecting {})",
                leg.amount_in,
                leg.direction,
                leg.expected_output
            );
        }

        self.wallet.execute(self.config.wallet, &plan.batch).await?;

        log_deposit!(
            "{} Deposited {} reference + {} token into pool {:?}",
            LogEmoji::SUCCESS,
            plan.reference_deposit,
            plan.token_deposit,
            pool
        );

        Ok(DepositReceipt {
            pool,
            token: deposit.token,
            reserves,
            plan,
        })
    }

    async fn execute_withdrawal(&self, request: &WithdrawalRequest) -> Result<WithdrawalReceipt> {
        let token = request.pair.token(self.config.reference_asset)?;
        let pool = self.resolve_pool(token).await?;

        let share_balance = self.ledger.balance_of(pool, self.config.wallet).await?;
        let shares_redeemed = withdrawal_amount(share_balance, request.fraction)?;
        info!(
            pool = ?pool,
            fraction = %request.fraction,
            share_balance = %share_balance,
            shares_redeemed = %shares_redeemed,
            "Planning withdrawal"
        );

        let (expected_reference, expected_token) = self.expected_redemption(pool, token, shares_redeemed).await?;

        let floor = U256::from(MIN_OUTPUT_FLOOR);
        let mut batch = CallBatch::new();
        batch.push(Invocation::new(
            pool,
            PoolCall::RemoveLiquidity {
                amount: shares_redeemed,
                min_eth: floor,
                min_tokens: floor,
                deadline: self.deadline(),
            },
        ));

        log_batch("withdrawal", &batch);
        self.wallet.execute(self.config.wallet, &batch).await?;

        log_withdraw!(
            "{} Redeemed {} of {} shares from pool {:?}",
            LogEmoji::SUCCESS,
            shares_redeemed,
            share_balance,
            pool
        );

        Ok(WithdrawalReceipt {
            pool,
            token,
            share_balance,
            shares_redeemed,
            expected_reference,
            expected_token,
            batch,
        })
    }

    /// Pro-rata share of both reserves for `shares`, zero for an empty pool
    async fn expected_redemption(&self, pool: Address, token: Address, shares: U256) -> Result<(U256, U256)> {
        let total_shares = self.ledger.total_supply(pool).await?;
        if total_shares.is_zero() || shares.is_zero() {
            return Ok((U256::zero(), U256::zero()));
        }
        let reserves = self.snapshot_reserves(pool, token).await?;
        Ok((
            checked::mul_div(shares, reserves.reference, total_shares, "expected reference out")?,
            checked::mul_div(shares, reserves.token, total_shares, "expected token out")?,
        ))
    }

    async fn resolve_pool(&self, token: Address) -> Result<Address> {
        match self.registry.pool_address(token).await? {
            Some(pool) if !pool.is_zero() => Ok(pool),
            _ => Err(ProvisionError::PoolNotFound { token }),
        }
    }

    async fn snapshot_reserves(&self, pool: Address, token: Address) -> Result<PoolReserves> {
        let reference = self
            .ledger
            .balance_of(self.config.reference_asset, pool)
            .await?;
        let token_reserve = self.ledger.balance_of(token, pool).await?;
        debug!(
            "{} Pool {:?} reserves: {} reference / {} token",
            LogEmoji::POOL,
            pool,
            reference,
            token_reserve
        );
        Ok(PoolReserves::new(reference, token_reserve))
    }

    async fn ensure_balance(&self, asset: Address, requested: U256) -> Result<()> {
        let available = self.ledger.balance_of(asset, self.config.wallet).await?;
        if requested > available {
            return Err(ProvisionError::InsufficientBalance {
                asset,
                requested,
                available,
            });
        }
        Ok(())
    }

    fn deadline(&self) -> U256 {
        U256::from(self.clock.now()) + U256::from(self.config.deadline_offset_secs)
    }
}
