//! Typed pool and token calls and the batches they are executed in
//!
//! The provisioner never talks to a pool directly. It describes each step as
//! an [`Invocation`] (target, attached reference-asset value, typed call) and
//! hands the whole ordered [`CallBatch`] to the custody wallet, which forwards
//! every call as the owning account. Calls carry their standard ABI encoding
//! so a wallet can forward the payload verbatim.

use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;
use serde::Serialize;
use std::fmt;

/// One call against a token or pool contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PoolCall {
    /// `token.approve(spender, amount)`
    Approve { spender: Address, amount: U256 },
    /// `pool.ethToTokenSwapInput(min_tokens, deadline)`, input sent as value
    EthToTokenSwapInput { min_tokens: U256, deadline: U256 },
    /// `pool.tokenToEthSwapInput(tokens_sold, min_eth, deadline)`
    TokenToEthSwapInput {
        tokens_sold: U256,
        min_eth: U256,
        deadline: U256,
    },
    /// `pool.addLiquidity(min_liquidity, max_tokens, deadline)`, reference
    /// asset sent as value
    AddLiquidity {
        min_liquidity: U256,
        max_tokens: U256,
        deadline: U256,
    },
    /// `pool.removeLiquidity(amount, min_eth, min_tokens, deadline)`
    RemoveLiquidity {
        amount: U256,
        min_eth: U256,
        min_tokens: U256,
        deadline: U256,
    },
}

impl PoolCall {
    /// Solidity signature the selector is derived from
    pub fn signature(&self) -> &'static str {
        match self {
            PoolCall::Approve { .. } => "approve(address,uint256)",
            PoolCall::EthToTokenSwapInput { .. } => "ethToTokenSwapInput(uint256,uint256)",
            PoolCall::TokenToEthSwapInput { .. } => "tokenToEthSwapInput(uint256,uint256,uint256)",
            PoolCall::AddLiquidity { .. } => "addLiquidity(uint256,uint256,uint256)",
            PoolCall::RemoveLiquidity { .. } => "removeLiquidity(uint256,uint256,uint256,uint256)",
        }
    }

    /// Function name without the argument list
    pub fn name(&self) -> &'static str {
        let signature = self.signature();
        signature.split('(').next().unwrap_or(signature)
    }

    pub fn selector(&self) -> [u8; 4] {
        id(self.signature())
    }

    fn arguments(&self) -> Vec<Token> {
        match *self {
            PoolCall::Approve { spender, amount } => vec![Token::Address(spender), Token::Uint(amount)],
            PoolCall::EthToTokenSwapInput {
                min_tokens,
                deadline,
            } => vec![Token::Uint(min_tokens), Token::Uint(deadline)],
            PoolCall::TokenToEthSwapInput {
                tokens_sold,
                min_eth,
                deadline,
            } => vec![
                Token::Uint(tokens_sold),
                Token::Uint(min_eth),
                Token::Uint(deadline),
            ],
            PoolCall::AddLiquidity {
                min_liquidity,
                max_tokens,
                deadline,
            } => vec![
                Token::Uint(min_liquidity),
                Token::Uint(max_tokens),
                Token::Uint(deadline),
            ],
            PoolCall::RemoveLiquidity {
                amount,
                min_eth,
                min_tokens,
                deadline,
            } => vec![
                Token::Uint(amount),
                Token::Uint(min_eth),
                Token::Uint(min_tokens),
                Token::Uint(deadline),
            ],
        }
    }

    /// Selector followed by the ABI-encoded arguments
    pub fn encode(&self) -> Bytes {
        let mut calldata = self.selector().to_vec();
        calldata.extend(encode(&self.arguments()));
        Bytes::from(calldata)
    }
}

impl fmt::Display for PoolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A call issued by the wallet to `target`, optionally carrying reference
/// asset as value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub target: Address,
    pub value: U256,
    pub call: PoolCall,
}

impl Invocation {
    pub fn new(target: Address, call: PoolCall) -> Self {
        Self {
            target,
            value: U256::zero(),
            call,
        }
    }

    pub fn with_value(target: Address, value: U256, call: PoolCall) -> Self {
        Self { target, value, call }
    }

    pub fn calldata(&self) -> Bytes {
        self.call.encode()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {:?} with value {}", self.call, self.target, self.value)
    }
}

/// Ordered calls that must take effect together or not at all
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallBatch {
    invocations: Vec<Invocation>,
}

impl CallBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, invocation: Invocation) {
        self.invocations.push(invocation);
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Total reference asset attached across all calls
    pub fn total_value(&self) -> U256 {
        self.invocations
            .iter()
            .fold(U256::zero(), |acc, inv| acc.saturating_add(inv.value))
    }

    /// Call names in execution order, for logging and assertions
    pub fn call_names(&self) -> Vec<&'static str> {
        self.invocations.iter().map(|inv| inv.call.name()).collect()
    }
}

impl<'a> IntoIterator for &'a CallBatch {
    type Item = &'a Invocation;
    type IntoIter = std::slice::Iter<'a, Invocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.invocations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_encoding() {
        let call = PoolCall::Approve {
            spender: Address::repeat_byte(0x11),
            amount: U256::from(742u64),
        };
        let calldata = call.encode();

        assert_eq!(hex::encode(&calldata[..4]), "095ea7b3");
        assert_eq!(calldata.len(), 4 + 32 * 2);
        assert_eq!(&calldata[16..36], Address::repeat_byte(0x11).as_bytes());
        assert_eq!(U256::from_big_endian(&calldata[36..68]), U256::from(742u64));
    }

    #[test]
    fn test_remove_liquidity_encoding_length() {
        let call = PoolCall::RemoveLiquidity {
            amount: U256::from(2_500u64),
            min_eth: U256::one(),
            min_tokens: U256::one(),
            deadline: U256::from(1_700_000_001u64),
        };
        assert_eq!(call.name(), "removeLiquidity");
        assert_eq!(call.encode().len(), 4 + 32 * 4);
    }

    #[test]
    fn test_invocation_display_names_target_and_value() {
        let invocation = Invocation::with_value(
            Address::repeat_byte(0x33),
            U256::from(1_499u64),
            PoolCall::AddLiquidity {
                min_liquidity: U256::one(),
                max_tokens: U256::from(742u64),
                deadline: U256::from(10u64),
            },
        );
        assert_eq!(
            invocation.to_string(),
            format!("addLiquidity on {:?} with value 1499", Address::repeat_byte(0x33))
        );
    }

    #[test]
    fn test_batch_value_and_order() {
        let pool = Address::repeat_byte(0x33);
        let mut batch = CallBatch::new();
        batch.push(Invocation::with_value(
            pool,
            U256::from(500u64),
            PoolCall::EthToTokenSwapInput {
                min_tokens: U256::one(),
                deadline: U256::from(10u64),
            },
        ));
        batch.push(Invocation::new(
            Address::repeat_byte(0x44),
            PoolCall::Approve {
                spender: pool,
                amount: U256::from(742u64),
            },
        ));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total_value(), U256::from(500u64));
        assert_eq!(batch.call_names(), vec!["ethToTokenSwapInput", "approve"]);
    }
}
