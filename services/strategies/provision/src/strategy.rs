//! Yield strategy interface

use crate::error::Result;
use crate::metrics::StrategyMetrics;
use crate::provisioner::{DepositReceipt, LiquidityProvisioner, WithdrawalReceipt};
use crate::request::{AssetPair, DepositRequest, WithdrawalRequest};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use tidepool_amm::BasisPoints;

/// Contract shared by every pool backend a wallet can invest through
#[async_trait]
pub trait YieldStrategy: Send + Sync {
    type Position: Send;
    type Redemption: Send;

    /// Strategy name for identification
    fn name(&self) -> &'static str;

    /// Invest the requested amounts
    async fn open(&self, request: &DepositRequest) -> Result<Self::Position>;

    /// Withdraw `fraction` of the position held against `pair`
    async fn close(&self, pair: &AssetPair, fraction: BasisPoints) -> Result<Self::Redemption>;

    /// Current value of the position in `token`'s pool
    async fn query(&self, token: Address) -> Result<U256>;

    fn metrics(&self) -> StrategyMetrics;
}

#[async_trait]
impl YieldStrategy for LiquidityProvisioner {
    type Position = DepositReceipt;
    type Redemption = WithdrawalReceipt;

    fn name(&self) -> &'static str {
        "reference-pool-provisioner"
    }

    async fn open(&self, request: &DepositRequest) -> Result<DepositReceipt> {
        self.add_liquidity(request).await
    }

    async fn close(&self, pair: &AssetPair, fraction: BasisPoints) -> Result<WithdrawalReceipt> {
        let request = WithdrawalRequest {
            pair: *pair,
            fraction,
        };
        self.remove_liquidity(&request).await
    }

    async fn query(&self, token: Address) -> Result<U256> {
        self.position_value(token).await
    }

    fn metrics(&self) -> StrategyMetrics {
        LiquidityProvisioner::metrics(self)
    }
}
