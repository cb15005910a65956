//! 锁仓交易错误分类
//! 每一种错误都有稳定的错误码和面向用户的提示，不允许静默丢弃

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::token_amount::AmountError;

/// 交易序列中的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStep {
    Approve,
    Mint,
    Lock,
    IncreaseAmount,
}

impl TxStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Mint => "mint",
            Self::Lock => "lock",
            Self::IncreaseAmount => "increase_amount",
        }
    }
}

impl fmt::Display for TxStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("wallet is not connected")]
    WalletDisconnected,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid lock period: {0} days")]
    InvalidLockPeriod(u32),

    #[error("wrong network: expected chain {expected}, wallet is on {actual:?}")]
    NetworkMismatch { expected: u64, actual: Option<u64> },

    #[error("approval rejected: {0}")]
    ApprovalRejected(String),

    #[error("{step} transaction rejected: {reason}")]
    TransactionRejected { step: TxStep, reason: String },

    #[error("another submission is still in flight")]
    SubmissionInFlight,

    #[error("{step} step timed out")]
    Timeout { step: TxStep },

    #[error("balance unavailable: {0}")]
    BalanceUnavailable(String),
}

impl LockError {
    /// 稳定错误码（API 响应与日志使用）
    pub fn code(&self) -> &'static str {
        match self {
            Self::WalletDisconnected => "wallet_disconnected",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidLockPeriod(_) => "invalid_lock_period",
            Self::NetworkMismatch { .. } => "network_mismatch",
            Self::ApprovalRejected(_) => "approval_rejected",
            Self::TransactionRejected { .. } => "transaction_rejected",
            Self::SubmissionInFlight => "submission_in_flight",
            Self::Timeout { .. } => "timeout",
            Self::BalanceUnavailable(_) => "balance_unavailable",
        }
    }

    /// 面向用户的提示
    pub fn user_message(&self) -> String {
        match self {
            Self::WalletDisconnected => "Connect your wallet to continue".to_string(),
            Self::InvalidAmount(reason) => format!("Enter a valid amount ({})", reason),
            Self::InvalidLockPeriod(days) => format!(
                "Lock period must be between {} and {} days, got {}",
                super::lock_period::MIN_LOCK_DAYS,
                super::lock_period::MAX_LOCK_DAYS,
                days
            ),
            Self::NetworkMismatch { expected, .. } => {
                format!("Switch your wallet to chain {} and try again", expected)
            }
            Self::ApprovalRejected(_) => "The token approval was rejected".to_string(),
            Self::TransactionRejected { step, .. } => {
                format!("The {} transaction was rejected", step)
            }
            Self::SubmissionInFlight => {
                "A transaction is already being processed, please wait".to_string()
            }
            Self::Timeout { step } => format!(
                "The {} transaction is taking too long, check your wallet before retrying",
                step
            ),
            Self::BalanceUnavailable(_) => "Unable to load your balance right now".to_string(),
        }
    }
}

impl From<AmountError> for LockError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}
