//! 余额读取
//! balanceOf(account) → 按代币精度格式化的十进制字符串

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{format_units, Deployment, LockError, Token, WalletSession};

/// 未连接钱包时返回的默认余额
pub const DISCONNECTED_BALANCE: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Balances {
    pub iq: String,
    pub hiiq: String,
    pub piq: String,
}

pub struct BalanceReader {
    deployment: Deployment,
}

impl BalanceReader {
    pub fn new(deployment: Deployment) -> Self {
        Self { deployment }
    }

    /// 查询单个代币余额，未连接时返回 "0" 且不发起任何调用；
    /// 已连接但链 ID 与部署不一致时返回 `NetworkMismatch`
    pub async fn get_balance(
        &self,
        session: &WalletSession,
        token: Token,
    ) -> Result<String, LockError> {
        let Some((account, client)) = session.signer() else {
            return Ok(DISCONNECTED_BALANCE.to_string());
        };

        if session.chain_id() != Some(self.deployment.chain_id) {
            tracing::warn!(
                token = token.symbol(),
                expected = self.deployment.chain_id,
                actual = ?session.chain_id(),
                "Balance requested on the wrong network"
            );
            return Err(LockError::NetworkMismatch {
                expected: self.deployment.chain_id,
                actual: session.chain_id(),
            });
        }

        let address = self.deployment.token_address(token);
        let raw = client
            .balance_of(address, account)
            .await
            .map_err(|e| {
                tracing::warn!(
                    token = token.symbol(),
                    account = ?account,
                    error = %e,
                    "Failed to read token balance"
                );
                LockError::BalanceUnavailable(e.to_string())
            })?;

        let formatted = format_units(raw, self.deployment.decimals);
        tracing::debug!(
            token = token.symbol(),
            account = ?account,
            raw = %raw,
            balance = %formatted,
            "Fetched token balance"
        );
        Ok(formatted)
    }

    /// 依次查询 IQ / hiIQ / pIQ
    pub async fn get_balances(&self, session: &WalletSession) -> Result<Balances, LockError> {
        Ok(Balances {
            iq: self.get_balance(session, Token::Iq).await?,
            hiiq: self.get_balance(session, Token::HiIq).await?,
            piq: self.get_balance(session, Token::PIq).await?,
        })
    }
}

/// 余额字符串是否大于零
pub fn is_positive_balance(balance: &str) -> bool {
    let s = balance.trim();
    let well_formed = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && s.bytes().filter(|b| *b == b'.').count() <= 1;
    well_formed && s.bytes().any(|b| (b'1'..=b'9').contains(&b))
}
