//! In-memory chain for exercising the provisioner
//!
//! [`SimulatedChain`] plays all three collaborators at once: it registers
//! pools, reports balances and supplies, and executes wallet batches with
//! the pricing, rounding and floor checks of a reference-asset exchange
//! pool. Batches run against a copy of the state that is committed only if
//! every call succeeds, matching the atomicity [`Wallet`] promises.

use crate::calls::{CallBatch, Invocation, PoolCall};
use crate::collaborators::{AssetLedger, PoolRegistry, Wallet};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use parking_lot::Mutex;
use std::collections::HashMap;
use tidepool_amm::{checked, V2Math};
use tracing::debug;

type Revert<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, Default)]
struct ChainState {
    now: u64,
    native: HashMap<Address, U256>,
    /// (token, owner) -> balance; pool shares are keyed by the pool address
    balances: HashMap<(Address, Address), U256>,
    supplies: HashMap<Address, U256>,
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    pools: HashMap<Address, Address>,
    pool_tokens: HashMap<Address, Address>,
}

impl ChainState {
    fn native_of(&self, owner: Address) -> U256 {
        self.native.get(&owner).copied().unwrap_or_default()
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    fn supply(&self, token: Address) -> U256 {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> Revert<()> {
        let available = self.native_of(from);
        if available < amount {
            return Err(format!("native balance {} below {}", available, amount));
        }
        self.native.insert(from, available - amount);
        *self.native.entry(to).or_default() += amount;
        Ok(())
    }

    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Revert<()> {
        let available = self.balance(token, from);
        if available < amount {
            return Err(format!("token balance {} below {}", available, amount));
        }
        self.balances.insert((token, from), available - amount);
        *self.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Revert<()> {
        let allowance = self
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(format!("allowance {} below {}", allowance, amount));
        }
        self.allowances.insert((token, owner, spender), allowance - amount);
        self.transfer(token, owner, spender, amount)
    }

    fn mint(&mut self, token: Address, owner: Address, amount: U256) {
        *self.balances.entry((token, owner)).or_default() += amount;
        *self.supplies.entry(token).or_default() += amount;
    }

    fn burn(&mut self, token: Address, owner: Address, amount: U256) -> Revert<()> {
        let available = self.balance(token, owner);
        if available < amount {
            return Err(format!("share balance {} below {}", available, amount));
        }
        self.balances.insert((token, owner), available - amount);
        let supply = self.supply(token);
        self.supplies.insert(token, supply.saturating_sub(amount));
        Ok(())
    }

    fn pool_token(&self, pool: Address) -> Revert<Address> {
        self.pool_tokens
            .get(&pool)
            .copied()
            .ok_or_else(|| format!("{:?} is not a pool", pool))
    }

    fn apply(&mut self, sender: Address, invocation: &Invocation) -> Revert<Bytes> {
        // Attached value moves before the call body runs
        self.transfer_native(sender, invocation.target, invocation.value)?;

        match invocation.call {
            PoolCall::Approve { spender, amount } => {
                if !invocation.value.is_zero() {
                    return Err("approve is not payable".to_string());
                }
                self.allowances
                    .insert((invocation.target, sender, spender), amount);
                Ok(encode(&[Token::Bool(true)]).into())
            }
            PoolCall::EthToTokenSwapInput {
                min_tokens,
                deadline,
            } => {
                let pool = invocation.target;
                let token = self.pool_token(pool)?;
                ensure(deadline >= U256::from(self.now), "deadline passed")?;
                ensure(!invocation.value.is_zero() && !min_tokens.is_zero(), "zero input or floor")?;

                let reference_reserve = self.native_of(pool) - invocation.value;
                let token_reserve = self.balance(token, pool);
                let bought = V2Math::quote(invocation.value, reference_reserve, token_reserve)
                    .map_err(|e| e.to_string())?;
                ensure(bought >= min_tokens, "output below floor")?;

                self.transfer(token, pool, sender, bought)?;
                Ok(encode(&[Token::Uint(bought)]).into())
            }
            PoolCall::TokenToEthSwapInput {
                tokens_sold,
                min_eth,
                deadline,
            } => {
                let pool = invocation.target;
                let token = self.pool_token(pool)?;
                ensure(deadline >= U256::from(self.now), "deadline passed")?;
                ensure(!tokens_sold.is_zero() && !min_eth.is_zero(), "zero input or floor")?;

                let token_reserve = self.balance(token, pool);
                let reference_reserve = self.native_of(pool);
                let bought = V2Math::quote(tokens_sold, token_reserve, reference_reserve)
                    .map_err(|e| e.to_string())?;
                ensure(bought >= min_eth, "output below floor")?;

                self.transfer_native(pool, sender, bought)?;
                self.transfer_from(token, sender, pool, tokens_sold)?;
                Ok(encode(&[Token::Uint(bought)]).into())
            }
            PoolCall::AddLiquidity {
                min_liquidity,
                max_tokens,
                deadline,
            } => {
                let pool = invocation.target;
                let token = self.pool_token(pool)?;
                ensure(deadline > U256::from(self.now), "deadline passed")?;
                ensure(!max_tokens.is_zero() && !invocation.value.is_zero(), "zero deposit")?;

                let total_shares = self.supply(pool);
                ensure(!total_shares.is_zero(), "pool has no liquidity")?;
                ensure(!min_liquidity.is_zero(), "zero share floor")?;

                let reference_reserve = self.native_of(pool) - invocation.value;
                let token_reserve = self.balance(token, pool);
                let token_amount = mul_div(invocation.value, token_reserve, reference_reserve)? + U256::one();
                let minted = mul_div(invocation.value, total_shares, reference_reserve)?;
                ensure(max_tokens >= token_amount, "token deposit above maximum")?;
                ensure(minted >= min_liquidity, "minted shares below floor")?;

                self.mint(pool, sender, minted);
                self.transfer_from(token, sender, pool, token_amount)?;
                Ok(encode(&[Token::Uint(minted)]).into())
            }
            PoolCall::RemoveLiquidity {
                amount,
                min_eth,
                min_tokens,
                deadline,
            } => {
                let pool = invocation.target;
                let token = self.pool_token(pool)?;
                ensure(!amount.is_zero(), "zero shares")?;
                ensure(deadline > U256::from(self.now), "deadline passed")?;
                ensure(!min_eth.is_zero() && !min_tokens.is_zero(), "zero floor")?;

                let total_shares = self.supply(pool);
                ensure(!total_shares.is_zero(), "pool has no liquidity")?;
                let reference_out = mul_div(amount, self.native_of(pool), total_shares)?;
                let token_out = mul_div(amount, self.balance(token, pool), total_shares)?;
                ensure(
                    reference_out >= min_eth && token_out >= min_tokens,
                    "output below floor",
                )?;

                self.burn(pool, sender, amount)?;
                self.transfer_native(pool, sender, reference_out)?;
                self.transfer(token, pool, sender, token_out)?;
                Ok(encode(&[Token::Uint(reference_out), Token::Uint(token_out)]).into())
            }
        }
    }
}

fn mul_div(a: U256, b: U256, c: U256) -> Revert<U256> {
    checked::mul_div(a, b, c, "pool arithmetic").map_err(|e| e.to_string())
}

fn ensure(condition: bool, reason: &str) -> Revert<()> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

/// Shared in-memory ledger, registry and wallet
#[derive(Debug)]
pub struct SimulatedChain {
    reference: Address,
    state: Mutex<ChainState>,
}

impl SimulatedChain {
    /// `reference` is the address standing for the native asset
    pub fn new(reference: Address, now: u64) -> Self {
        Self {
            reference,
            state: Mutex::new(ChainState {
                now,
                ..ChainState::default()
            }),
        }
    }

    pub fn set_time(&self, now: u64) {
        self.state.lock().now = now;
    }

    /// Create a seeded pool for `token`; `provider` receives the initial
    /// shares, one per unit of reference reserve
    pub fn register_pool(
        &self,
        token: Address,
        pool: Address,
        provider: Address,
        reference_reserve: U256,
        token_reserve: U256,
    ) {
        let mut state = self.state.lock();
        state.pools.insert(token, pool);
        state.pool_tokens.insert(pool, token);
        *state.native.entry(pool).or_default() += reference_reserve;
        state.mint(token, pool, token_reserve);
        state.mint(pool, provider, reference_reserve);
    }

    /// Credit `owner` with `amount` of `asset` out of thin air
    pub fn mint(&self, asset: Address, owner: Address, amount: U256) {
        let mut state = self.state.lock();
        if asset == self.reference {
            *state.native.entry(owner).or_default() += amount;
        } else {
            state.mint(asset, owner, amount);
        }
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn read_balance(&self, asset: Address, owner: Address) -> U256 {
        let state = self.state.lock();
        if asset == self.reference {
            state.native_of(owner)
        } else {
            state.balance(asset, owner)
        }
    }
}

#[async_trait]
impl PoolRegistry for SimulatedChain {
    async fn pool_address(&self, token: Address) -> Result<Option<Address>, CollaboratorError> {
        Ok(self.state.lock().pools.get(&token).copied())
    }
}

#[async_trait]
impl AssetLedger for SimulatedChain {
    async fn balance_of(&self, asset: Address, owner: Address) -> Result<U256, CollaboratorError> {
        Ok(self.read_balance(asset, owner))
    }

    async fn total_supply(&self, asset: Address) -> Result<U256, CollaboratorError> {
        Ok(self.state.lock().supply(asset))
    }
}

#[async_trait]
impl Wallet for SimulatedChain {
    async fn execute(&self, wallet: Address, batch: &CallBatch) -> Result<Vec<Bytes>, CollaboratorError> {
        let mut state = self.state.lock();
        let mut pending = state.clone();
        let mut outputs = Vec::with_capacity(batch.len());

        for invocation in batch {
            match pending.apply(wallet, invocation) {
                Ok(output) => outputs.push(output),
                Err(reason) => {
                    debug!(call = invocation.call.name(), %reason, "batch reverted");
                    return Err(CollaboratorError::new(invocation.call.name(), reason));
                }
            }
        }

        *state = pending;
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn reference() -> Address {
        Address::repeat_byte(0xee)
    }

    fn token() -> Address {
        Address::repeat_byte(0x44)
    }

    fn pool() -> Address {
        Address::repeat_byte(0x33)
    }

    fn wallet() -> Address {
        Address::repeat_byte(0x22)
    }

    fn seeded() -> SimulatedChain {
        let chain = SimulatedChain::new(reference(), NOW);
        chain.register_pool(token(), pool(), Address::zero(), U256::from(100_000u64), U256::from(50_000u64));
        chain
    }

    #[tokio::test]
    async fn test_swap_pays_quoted_output() {
        let chain = seeded();
        chain.mint(reference(), wallet(), U256::from(500u64));

        let mut batch = CallBatch::new();
        batch.push(Invocation::with_value(
            pool(),
            U256::from(500u64),
            PoolCall::EthToTokenSwapInput {
                min_tokens: U256::one(),
                deadline: U256::from(NOW),
            },
        ));
        chain.execute(wallet(), &batch).await.unwrap();

        assert_eq!(chain.balance_of(token(), wallet()).await.unwrap(), U256::from(248u64));
        assert_eq!(chain.balance_of(reference(), pool()).await.unwrap(), U256::from(100_500u64));
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_state_untouched() {
        let chain = seeded();
        chain.mint(token(), wallet(), U256::from(1_000u64));

        let mut batch = CallBatch::new();
        batch.push(Invocation::new(
            token(),
            PoolCall::Approve {
                spender: pool(),
                amount: U256::from(1_000u64),
            },
        ));
        // no reference balance to attach
        batch.push(Invocation::with_value(
            pool(),
            U256::from(10u64),
            PoolCall::AddLiquidity {
                min_liquidity: U256::one(),
                max_tokens: U256::from(1_000u64),
                deadline: U256::from(NOW + 1),
            },
        ));

        let err = chain.execute(wallet(), &batch).await.unwrap_err();
        assert_eq!(err.call, "addLiquidity");
        assert_eq!(chain.allowance(token(), wallet(), pool()), U256::zero());
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let chain = seeded();
        assert_eq!(chain.pool_address(token()).await.unwrap(), Some(pool()));
        assert_eq!(chain.pool_address(Address::repeat_byte(0x55)).await.unwrap(), None);
        assert_eq!(chain.total_supply(pool()).await.unwrap(), U256::from(100_000u64));
    }
}
