// Gas Limit 估算
// 优先使用节点估算值并加上安全余量，估算失败时降级为配置的固定值

use ethers::types::U256;

use super::chain_client::{ChainClient, TokenCall};
use crate::config::GasConfig;

#[derive(Debug, Clone)]
pub struct GasEstimator {
    approve_fallback: U256,
    action_fallback: U256,
    bump_percent: u32,
}

impl GasEstimator {
    pub fn new(config: &GasConfig) -> Self {
        Self {
            approve_fallback: U256::from(config.approve_gas_limit),
            action_fallback: U256::from(config.action_gas_limit),
            bump_percent: config.bump_percent,
        }
    }

    fn fallback_for(&self, call: &TokenCall) -> U256 {
        match call {
            TokenCall::Approve { .. } => self.approve_fallback,
            _ => self.action_fallback,
        }
    }

    /// 计算交易的 gas limit
    pub async fn gas_limit(&self, client: &dyn ChainClient, call: &TokenCall) -> U256 {
        match client.estimate_gas(call).await {
            Ok(estimated) => {
                let limit = Self::apply_gas_bump(estimated, self.bump_percent);
                tracing::debug!(
                    step = %call.step(),
                    estimated = %estimated,
                    limit = %limit,
                    "Gas limit estimated"
                );
                limit
            }
            Err(e) => {
                let fallback = self.fallback_for(call);
                tracing::warn!(
                    step = %call.step(),
                    error = %e,
                    fallback = %fallback,
                    "Gas estimation failed, using configured gas limit"
                );
                fallback
            }
        }
    }

    /// 应用 gas 增加百分比
    pub fn apply_gas_bump(base_gas: U256, bump_percent: u32) -> U256 {
        let multiplier = U256::from(100u64 + bump_percent as u64);
        base_gas.saturating_mul(multiplier) / U256::from(100u64)
    }
}
