//! External collaborator interfaces
//!
//! The provisioner owns no balances or reserves. It reads them through an
//! [`AssetLedger`], finds pools through a [`PoolRegistry`] and issues every
//! mutation through a [`Wallet`].

use crate::calls::CallBatch;
use crate::error::CollaboratorError;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

/// Maps a token to the address of its reference-asset pool
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// `None` when no pool exists for `token`
    async fn pool_address(&self, token: Address) -> Result<Option<Address>, CollaboratorError>;
}

/// Read-only view of balances and supplies
///
/// Pool shares are a token issued by the pool itself, so the share balance
/// of `owner` is `balance_of(pool, owner)`. Querying the reference-asset
/// address returns the native balance.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    async fn balance_of(&self, asset: Address, owner: Address) -> Result<U256, CollaboratorError>;

    async fn total_supply(&self, asset: Address) -> Result<U256, CollaboratorError>;
}

/// Custody layer executing calls as the owning account
///
/// # Atomicity
///
/// `execute` must apply the whole batch or none of it. The provisioner builds
/// approve, swap and deposit as one batch and relies on this boundary instead
/// of compensating for partially applied batches. An implementation backed by
/// a chain satisfies it by submitting the batch as a single transaction (for
/// example through a multicall on the wallet contract).
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Execute `batch` on behalf of `wallet`, returning each call's return data
    async fn execute(&self, wallet: Address, batch: &CallBatch) -> Result<Vec<Bytes>, CollaboratorError>;
}
