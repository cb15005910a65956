// 代币交易序列器
// 两步严格顺序执行：approve(spender, amount) → mint / lock / increase_amount
// 每一步都等待上链确认，任一步失败都会返回具体的失败步骤

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{
    chain_client::{ChainClient, TokenCall, TxReceiptSummary},
    gas_estimator::GasEstimator,
};
use crate::domain::{
    Deployment, LockError, LockPeriod, SubmissionStatus, TokenAmount, TxStep, WalletSession,
};

/// 第二步调用的目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockAction {
    /// pIQ → IQ，调用 minter.mint
    Convert,
    /// 新建锁仓，调用 hiIQ.lock
    Lock { days: u32 },
    /// 追加已有锁仓，调用 hiIQ.increase_amount
    IncreaseAmount,
}

/// 成功提交的结果，保留两笔交易的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub action: LockAction,
    pub amount: String,
    pub approve_tx: TxReceiptSummary,
    pub action_tx: TxReceiptSummary,
}

/// 同一时间只允许一笔提交，离开作用域时自动释放
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct TokenTxSequencer {
    deployment: Deployment,
    gas: GasEstimator,
    step_timeout: Duration,
    in_flight: AtomicBool,
    status: watch::Sender<SubmissionStatus>,
}

impl TokenTxSequencer {
    pub fn new(deployment: Deployment, gas: GasEstimator, step_timeout: Duration) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        Self {
            deployment,
            gas,
            step_timeout,
            in_flight: AtomicBool::new(false),
            status,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status.borrow()
    }

    /// 订阅提交状态变化
    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 布尔结果接口：不带锁仓时间时执行 convert，带时间时执行 lock
    pub async fn lock_or_convert(
        &self,
        amount: &str,
        session: &WalletSession,
        time: Option<u32>,
    ) -> bool {
        let action = match time {
            Some(days) => LockAction::Lock { days },
            None => LockAction::Convert,
        };

        match self.submit(session, amount, action).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    code = e.code(),
                    error = %e,
                    action = ?action,
                    "Token transaction sequence did not complete"
                );
                false
            }
        }
    }

    /// 执行 approve → 目标调用，所有校验在任何网络调用之前完成
    pub async fn submit(
        &self,
        session: &WalletSession,
        amount: &str,
        action: LockAction,
    ) -> Result<TxOutcome, LockError> {
        let (account, client) = session.signer().ok_or(LockError::WalletDisconnected)?;

        if session.chain_id() != Some(self.deployment.chain_id) {
            return Err(LockError::NetworkMismatch {
                expected: self.deployment.chain_id,
                actual: session.chain_id(),
            });
        }

        let amount = TokenAmount::parse(amount, self.deployment.decimals)?;
        if amount.is_zero() {
            return Err(LockError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }

        let (approve, target) = self.plan(amount, action)?;

        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(LockError::SubmissionInFlight)?;

        tracing::info!(
            account = ?account,
            amount = %amount,
            action = ?action,
            chain_id = self.deployment.chain_id,
            "Starting token transaction sequence"
        );

        self.set_status(SubmissionStatus::Approving);
        let approve_tx = match self.run_step(client.as_ref(), &approve).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.set_status(SubmissionStatus::Failed);
                return Err(e);
            }
        };

        self.set_status(SubmissionStatus::Executing);
        let action_tx = match self.run_step(client.as_ref(), &target).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.set_status(SubmissionStatus::Failed);
                return Err(e);
            }
        };

        self.set_status(SubmissionStatus::Confirmed);
        tracing::info!(
            approve_tx = ?approve_tx.tx_hash,
            action_tx = ?action_tx.tx_hash,
            step = %target.step(),
            "Token transaction sequence confirmed"
        );

        Ok(TxOutcome {
            action,
            amount: amount.to_string(),
            approve_tx,
            action_tx,
        })
    }

    /// 生成 approve 调用和目标合约调用
    fn plan(
        &self,
        amount: TokenAmount,
        action: LockAction,
    ) -> Result<(TokenCall, TokenCall), LockError> {
        let d = &self.deployment;
        let raw = amount.raw();

        let (token, spender, target) = match action {
            LockAction::Convert => (
                d.ptoken,
                d.ptoken_minter,
                TokenCall::Mint {
                    minter: d.ptoken_minter,
                    amount: raw,
                },
            ),
            LockAction::Lock { days } => {
                let period = LockPeriod::new(days)?;
                (
                    d.iq_token,
                    d.hiiq_locker,
                    TokenCall::Lock {
                        locker: d.hiiq_locker,
                        amount: raw,
                        unlock_time: period.unlock_timestamp(Utc::now()),
                    },
                )
            }
            LockAction::IncreaseAmount => (
                d.iq_token,
                d.hiiq_locker,
                TokenCall::IncreaseAmount {
                    locker: d.hiiq_locker,
                    amount: raw,
                },
            ),
        };

        let approve = TokenCall::Approve {
            token,
            spender,
            amount: raw,
        };
        Ok((approve, target))
    }

    async fn run_step(
        &self,
        client: &dyn ChainClient,
        call: &TokenCall,
    ) -> Result<TxReceiptSummary, LockError> {
        let step = call.step();
        // 超时覆盖 gas 估算和发送两部分
        let attempt = async {
            let gas_limit = self.gas.gas_limit(client, call).await;
            client.send(call, gas_limit).await
        };

        let result = tokio::time::timeout(self.step_timeout, attempt)
            .await
            .map_err(|_| {
                tracing::error!(step = %step, timeout = ?self.step_timeout, "Transaction step timed out");
                LockError::Timeout { step }
            })?;

        result.map_err(|e| {
            tracing::error!(step = %step, error = %e, "Transaction step failed");
            match step {
                TxStep::Approve => LockError::ApprovalRejected(e.to_string()),
                _ => LockError::TransactionRejected {
                    step,
                    reason: e.to_string(),
                },
            }
        })
    }

    fn set_status(&self, next: SubmissionStatus) {
        let previous = self.status.send_replace(next);
        if !previous.can_transition_to(&next) {
            tracing::warn!(from = %previous, to = %next, "Unexpected submission status transition");
        }
    }
}
