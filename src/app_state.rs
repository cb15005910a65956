use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    domain::{Deployment, WalletSession},
    service::{
        balance_reader::BalanceReader, gas_estimator::GasEstimator,
        tx_sequencer::TokenTxSequencer,
    },
};

/// 应用状态
/// 包含所有共享资源
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// 启动时建立的钱包会话
    pub session: WalletSession,
    /// 全进程唯一的交易序列器（提交互斥依赖它）
    pub sequencer: Arc<TokenTxSequencer>,
    pub balance_reader: Arc<BalanceReader>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(config: Arc<Config>, session: WalletSession) -> anyhow::Result<Self> {
        let deployment = Deployment::from_config(&config.network, &config.contracts)?;

        tracing::info!(
            chain_id = deployment.chain_id,
            network = %deployment.network_name,
            iq_token = ?deployment.iq_token,
            hiiq_locker = ?deployment.hiiq_locker,
            ptoken = ?deployment.ptoken,
            ptoken_minter = ?deployment.ptoken_minter,
            "Contract deployment resolved"
        );

        let gas = GasEstimator::new(&config.gas);
        let sequencer = Arc::new(TokenTxSequencer::new(
            deployment.clone(),
            gas,
            Duration::from_secs(config.transaction.step_timeout_secs),
        ));
        let balance_reader = Arc::new(BalanceReader::new(deployment));

        Ok(Self {
            config,
            session,
            sequencer,
            balance_reader,
        })
    }

    pub fn expected_chain_id(&self) -> u64 {
        self.sequencer.deployment().chain_id
    }
}
