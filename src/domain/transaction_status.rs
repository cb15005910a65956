//! 提交状态
//! approve → 目标合约调用 两步序列的状态机

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// 尚未提交
    Idle,

    /// approve 交易已发出，等待确认
    Approving,

    /// 授权完成，目标合约调用等待确认
    Executing,

    /// 两笔交易均已确认
    Confirmed,

    /// 任一步骤失败
    Failed,
}

impl SubmissionStatus {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Approving => "Waiting for token approval",
            Self::Executing => "Waiting for transaction confirmation",
            Self::Confirmed => "Tx executed",
            Self::Failed => "Transaction failed",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// 验证状态转换合法性
    pub fn can_transition_to(&self, target: &Self) -> bool {
        use SubmissionStatus::*;

        match (self, target) {
            // 新一轮提交可以从空闲或上一轮的最终状态开始
            (Idle, Approving) | (Confirmed, Approving) | (Failed, Approving) => true,

            (Approving, Executing) | (Approving, Failed) => true,

            (Executing, Confirmed) | (Executing, Failed) => true,

            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Approving => "approving",
            Self::Executing => "executing",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
