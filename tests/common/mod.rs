//! 测试辅助模块
//! 提供可编程的链上客户端和测试配置

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use iqbridge::{
    config::{
        Config, ContractsConfig, GasConfig, LoggingConfig, NetworkConfig, ServerConfig,
        TransactionConfig, WalletConfig,
    },
    domain::{deployment::POLYGON_CHAIN_ID, Deployment, TxStep, WalletSession},
    service::{ChainClient, ChainError, TokenCall, TxReceiptSummary},
};

pub const ESTIMATED_GAS: u64 = 100_000;

/// 记录所有调用的链上客户端
#[derive(Default)]
pub struct MockChainClient {
    sent: Mutex<Vec<(TokenCall, U256)>>,
    estimated: Mutex<Vec<TokenCall>>,
    balances: Mutex<HashMap<Address, U256>>,
    balance_queries: AtomicU64,
    fail_step: Mutex<Option<TxStep>>,
    fail_estimate: AtomicBool,
    fail_balance: AtomicBool,
    send_delay: Mutex<Option<Duration>>,
    estimate_delay: Mutex<Option<Duration>>,
    next_hash: AtomicU64,
}

impl MockChainClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 指定步骤的 send 返回 Reverted
    pub fn fail_on(&self, step: TxStep) {
        *self.fail_step.lock().unwrap() = Some(step);
    }

    pub fn fail_estimates(&self) {
        self.fail_estimate.store(true, Ordering::SeqCst);
    }

    pub fn fail_balances(&self) {
        self.fail_balance.store(true, Ordering::SeqCst);
    }

    pub fn delay_sends(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = Some(delay);
    }

    /// estimate_gas 在返回前等待指定时长
    pub fn delay_estimates(&self, delay: Duration) {
        *self.estimate_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_balance(&self, token: Address, amount: U256) {
        self.balances.lock().unwrap().insert(token, amount);
    }

    pub fn sent(&self) -> Vec<(TokenCall, U256)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_steps(&self) -> Vec<TxStep> {
        self.sent().iter().map(|(call, _)| call.step()).collect()
    }

    pub fn estimate_count(&self) -> usize {
        self.estimated.lock().unwrap().len()
    }

    pub fn balance_queries(&self) -> u64 {
        self.balance_queries.load(Ordering::SeqCst)
    }

    /// 没有发生任何链上调用
    pub fn untouched(&self) -> bool {
        self.sent().is_empty() && self.estimate_count() == 0 && self.balance_queries() == 0
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256, ChainError> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("connection refused".into()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn estimate_gas(&self, call: &TokenCall) -> Result<U256, ChainError> {
        self.estimated.lock().unwrap().push(call.clone());

        let delay = *self.estimate_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_estimate.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("execution reverted".into()));
        }
        Ok(U256::from(ESTIMATED_GAS))
    }

    async fn send(
        &self,
        call: &TokenCall,
        gas_limit: U256,
    ) -> Result<TxReceiptSummary, ChainError> {
        self.sent.lock().unwrap().push((call.clone(), gas_limit));

        let delay = *self.send_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let n = self.next_hash.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = H256::from_low_u64_be(n);

        if *self.fail_step.lock().unwrap() == Some(call.step()) {
            return Err(ChainError::Reverted(tx_hash));
        }

        Ok(TxReceiptSummary {
            tx_hash,
            block_number: Some(1_000 + n),
            gas_used: Some(U256::from(ESTIMATED_GAS)),
        })
    }
}

pub fn account() -> Address {
    Address::from_low_u64_be(0xa11ce)
}

pub fn polygon() -> Deployment {
    Deployment::known(POLYGON_CHAIN_ID).unwrap()
}

pub fn connected_session(client: &Arc<MockChainClient>) -> WalletSession {
    WalletSession::connected(account(), POLYGON_CHAIN_ID, client.clone())
}

/// 18 位精度的整数个代币
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub fn gas_config() -> GasConfig {
    GasConfig {
        approve_gas_limit: 70_000,
        action_gas_limit: 125_000,
        bump_percent: 20,
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".into(),
        },
        logging: LoggingConfig {
            level: "debug".into(),
            format: "text".into(),
        },
        network: NetworkConfig {
            chain_id: POLYGON_CHAIN_ID,
            network_name: "polygon".into(),
            rpc_url: "http://localhost:8545".into(),
        },
        contracts: ContractsConfig {
            iq_token: None,
            hiiq_locker: None,
            ptoken: None,
            ptoken_minter: None,
            token_decimals: 18,
        },
        gas: gas_config(),
        transaction: TransactionConfig {
            confirmations: 1,
            step_timeout_secs: 5,
        },
        wallet: WalletConfig::default(),
    }
}
