// 链上调用客户端
// ChainClient 是钱包提供的 provider/signer 能力的抽象，生产环境由 ethers-rs 实现

use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    providers::Middleware,
    types::{transaction::eip2718::TypedTransaction, Address, H256, U256},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lock_error::TxStep;

mod bindings {
    pub mod erc20 {
        ethers::contract::abigen!(
            Erc20Token,
            r#"[
                function balanceOf(address owner) external view returns (uint256)
                function approve(address spender, uint256 amount) external returns (bool)
            ]"#
        );
    }

    pub mod minter {
        ethers::contract::abigen!(
            TokenMinter,
            r#"[
                function mint(uint256 _amount) external
            ]"#
        );
    }

    pub mod locker {
        ethers::contract::abigen!(
            HiIqLocker,
            r#"[
                function lock(uint256 _amount, uint256 _unlockTime) external
                function increase_amount(uint256 _value) external
            ]"#
        );
    }
}

use bindings::{erc20::Erc20Token, locker::HiIqLocker, minter::TokenMinter};

/// 需要签名发送的合约调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Mint {
        minter: Address,
        amount: U256,
    },
    Lock {
        locker: Address,
        amount: U256,
        unlock_time: u64,
    },
    IncreaseAmount {
        locker: Address,
        amount: U256,
    },
}

impl TokenCall {
    pub fn step(&self) -> TxStep {
        match self {
            Self::Approve { .. } => TxStep::Approve,
            Self::Mint { .. } => TxStep::Mint,
            Self::Lock { .. } => TxStep::Lock,
            Self::IncreaseAmount { .. } => TxStep::IncreaseAmount,
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            Self::Approve { amount, .. }
            | Self::Mint { amount, .. }
            | Self::Lock { amount, .. }
            | Self::IncreaseAmount { amount, .. } => *amount,
        }
    }
}

/// 已上链交易摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceiptSummary {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// 节点或签名者拒绝了请求
    #[error("rejected by provider: {0}")]
    Rejected(String),

    /// 交易已上链但执行失败
    #[error("transaction {0:?} reverted")]
    Reverted(H256),

    /// 交易从内存池中消失
    #[error("transaction {0:?} dropped before confirmation")]
    Dropped(H256),

    #[error("rpc error: {0}")]
    Rpc(String),
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    async fn estimate_gas(&self, call: &TokenCall) -> Result<U256, ChainError>;

    /// 发送交易并等待确认，执行失败返回 `ChainError::Reverted`
    async fn send(&self, call: &TokenCall, gas_limit: U256)
        -> Result<TxReceiptSummary, ChainError>;
}

/// 基于 ethers-rs Middleware 的实现（通常是 SignerMiddleware<Provider<Http>, LocalWallet>）
pub struct EthersChainClient<M> {
    client: Arc<M>,
    confirmations: usize,
}

impl<M: Middleware + 'static> EthersChainClient<M> {
    pub fn new(client: Arc<M>, confirmations: usize) -> Self {
        Self {
            client,
            confirmations: confirmations.max(1),
        }
    }

    fn build_tx(&self, call: &TokenCall) -> TypedTransaction {
        let mut tx = match call {
            TokenCall::Approve {
                token,
                spender,
                amount,
            } => {
                Erc20Token::new(*token, self.client.clone())
                    .approve(*spender, *amount)
                    .tx
            }
            TokenCall::Mint { minter, amount } => {
                TokenMinter::new(*minter, self.client.clone())
                    .mint(*amount)
                    .tx
            }
            TokenCall::Lock {
                locker,
                amount,
                unlock_time,
            } => {
                HiIqLocker::new(*locker, self.client.clone())
                    .lock(*amount, U256::from(*unlock_time))
                    .tx
            }
            TokenCall::IncreaseAmount { locker, amount } => {
                HiIqLocker::new(*locker, self.client.clone())
                    .increase_amount(*amount)
                    .tx
            }
        };

        // approve 的 msg.sender 决定授权归属，估算 gas 时必须带上 from
        if let Some(from) = self.client.default_sender() {
            tx.set_from(from);
        }
        tx
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainClient for EthersChainClient<M> {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        Erc20Token::new(token, self.client.clone())
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn estimate_gas(&self, call: &TokenCall) -> Result<U256, ChainError> {
        let tx = self.build_tx(call);
        self.client
            .estimate_gas(&tx, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn send(
        &self,
        call: &TokenCall,
        gas_limit: U256,
    ) -> Result<TxReceiptSummary, ChainError> {
        let mut tx = self.build_tx(call);
        tx.set_gas(gas_limit);

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::Rejected(e.to_string()))?;
        let tx_hash = pending.tx_hash();

        tracing::info!(
            tx_hash = ?tx_hash,
            step = %call.step(),
            gas_limit = %gas_limit,
            "Transaction submitted, waiting for confirmation"
        );

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or(ChainError::Dropped(tx_hash))?;

        // status == 1 表示执行成功
        if receipt.status != Some(1u64.into()) {
            return Err(ChainError::Reverted(tx_hash));
        }

        Ok(TxReceiptSummary {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        })
    }
}
