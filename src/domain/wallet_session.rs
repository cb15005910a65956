//! 钱包会话
//!
//! 连接状态、当前账户、所在链以及签名能力。签名能力只在已连接时存在，
//! 未连接的会话无法发起任何链上调用。

use std::{fmt, sync::Arc};

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::service::chain_client::ChainClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Disconnected,
    Connected,
    /// 钱包连接失败，通常是链不受支持
    Error,
}

impl WalletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

#[derive(Clone)]
pub struct WalletSession {
    status: WalletStatus,
    account: Option<Address>,
    chain_id: Option<u64>,
    provider: Option<Arc<dyn ChainClient>>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self {
            status: WalletStatus::Disconnected,
            account: None,
            chain_id: None,
            provider: None,
        }
    }

    pub fn connected(account: Address, chain_id: u64, provider: Arc<dyn ChainClient>) -> Self {
        Self {
            status: WalletStatus::Connected,
            account: Some(account),
            chain_id: Some(chain_id),
            provider: Some(provider),
        }
    }

    pub fn errored(account: Option<Address>, chain_id: Option<u64>) -> Self {
        Self {
            status: WalletStatus::Error,
            account,
            chain_id,
            provider: None,
        }
    }

    pub fn status(&self) -> WalletStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == WalletStatus::Connected
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// 已连接时返回账户和签名能力
    pub fn signer(&self) -> Option<(Address, &Arc<dyn ChainClient>)> {
        if !self.is_connected() {
            return None;
        }
        match (self.account, self.provider.as_ref()) {
            (Some(account), Some(provider)) => Some((account, provider)),
            _ => None,
        }
    }

    /// 钱包处于错误状态且不在期望的链上
    pub fn is_network_mismatch(&self, expected_chain_id: u64) -> bool {
        self.status == WalletStatus::Error && self.chain_id != Some(expected_chain_id)
    }

    pub fn reset(&mut self) {
        *self = Self::disconnected();
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("status", &self.status)
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_has_no_signer() {
        let session = WalletSession::disconnected();
        assert!(!session.is_connected());
        assert!(session.signer().is_none());
        assert_eq!(session.status().as_str(), "disconnected");
    }

    #[test]
    fn test_network_mismatch_only_in_error_state() {
        let wrong = WalletSession::errored(None, Some(1));
        assert!(wrong.is_network_mismatch(137));
        assert!(!wrong.is_network_mismatch(1));

        let unknown = WalletSession::errored(None, None);
        assert!(unknown.is_network_mismatch(137));

        assert!(!WalletSession::disconnected().is_network_mismatch(137));
    }

    #[test]
    fn test_reset() {
        let mut session = WalletSession::errored(Some(Address::zero()), Some(1));
        session.reset();
        assert_eq!(session.status(), WalletStatus::Disconnected);
        assert!(session.account().is_none());
        assert!(session.chain_id().is_none());
    }
}
