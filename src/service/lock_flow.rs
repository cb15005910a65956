//! 锁仓页面状态
//!
//! 不负责渲染，只维护页面需要的状态：余额、锁仓天数、是否可提交、
//! 交易完成提示、错误网络提示。

use std::str::FromStr;

use ethers::types::Address;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    balance_reader::{is_positive_balance, BalanceReader},
    tx_sequencer::{LockAction, TokenTxSequencer},
};
use crate::domain::{
    estimate_hiiq, lock_period::DEFAULT_LOCK_DAYS, LockPeriod, Token, WalletSession,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    TxExecuted,
    LoginRequired,
    Error(String),
}

impl Alert {
    pub fn text(&self) -> &str {
        match self {
            Self::TxExecuted => "Tx executed",
            Self::LoginRequired => "Login into Polygon",
            Self::Error(message) => message,
        }
    }
}

/// 锁仓摘要卡片
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockSummary {
    pub tokens_locked: Decimal,
    pub days: u32,
    pub estimated_hiiq: Decimal,
}

#[derive(Debug, Clone)]
pub struct LockFlow {
    expected_chain_id: u64,
    account: Option<Address>,
    tx_done: bool,
    updating_balance: bool,
    loading_balance: bool,
    balance: Option<String>,
    locked_balance: Option<String>,
    lock_days: u32,
    filled_amount: Option<String>,
    wrong_chain_prompt: bool,
    last_error: Option<String>,
}

impl LockFlow {
    pub fn new(expected_chain_id: u64) -> Self {
        Self {
            expected_chain_id,
            account: None,
            tx_done: false,
            updating_balance: false,
            loading_balance: false,
            balance: None,
            locked_balance: None,
            lock_days: DEFAULT_LOCK_DAYS,
            filled_amount: None,
            wrong_chain_prompt: false,
            last_error: None,
        }
    }

    /// 钱包状态变化时调用
    pub fn on_session_changed(&mut self, session: &WalletSession) {
        self.account = if session.is_connected() {
            session.account()
        } else {
            None
        };

        if session.is_network_mismatch(self.expected_chain_id) {
            tracing::info!(
                expected = self.expected_chain_id,
                actual = ?session.chain_id(),
                "Wallet is on the wrong network"
            );
            self.wrong_chain_prompt = true;
        }
    }

    pub fn dismiss_wrong_chain_prompt(&mut self) {
        self.wrong_chain_prompt = false;
    }

    pub fn set_amount(&mut self, amount: &str) {
        let amount = amount.trim();
        self.filled_amount = (!amount.is_empty()).then(|| amount.to_string());
    }

    pub fn set_lock_days(&mut self, days: u32) {
        self.lock_days = days;
    }

    pub async fn refresh_balances(&mut self, reader: &BalanceReader, session: &WalletSession) {
        self.loading_balance = true;

        match reader.get_balance(session, Token::Iq).await {
            Ok(balance) => self.balance = Some(balance),
            Err(e) => self.last_error = Some(e.user_message()),
        }
        match reader.get_balance(session, Token::HiIq).await {
            Ok(locked) => self.locked_balance = Some(locked),
            Err(e) => self.last_error = Some(e.user_message()),
        }

        self.loading_balance = false;
    }

    fn has_balance(&self) -> bool {
        self.balance.as_deref().map(is_positive_balance).unwrap_or(false)
    }

    fn has_existing_lock(&self) -> bool {
        self.locked_balance
            .as_deref()
            .map(is_positive_balance)
            .unwrap_or(false)
    }

    pub fn submit_enabled(&self) -> bool {
        self.account.is_some()
            && self.has_balance()
            && self.lock_days != 0
            && self.filled_amount.is_some()
    }

    pub fn summary(&self) -> Option<LockSummary> {
        if self.lock_days == 0 || !self.has_balance() {
            return None;
        }
        let tokens_locked = Decimal::from_str(self.filled_amount.as_deref()?).ok()?;
        let period = LockPeriod::new(self.lock_days).ok()?;
        Some(LockSummary {
            tokens_locked,
            days: period.days(),
            estimated_hiiq: estimate_hiiq(tokens_locked, period)?,
        })
    }

    /// 提交锁仓；已有锁仓时追加数量，否则新建锁仓
    pub async fn submit(
        &mut self,
        sequencer: &TokenTxSequencer,
        reader: &BalanceReader,
        session: &WalletSession,
    ) -> bool {
        if self.account.is_none() {
            return false;
        }

        let amount = self.filled_amount.clone().unwrap_or_default();
        let action = if self.has_existing_lock() {
            LockAction::IncreaseAmount
        } else {
            LockAction::Lock {
                days: self.lock_days,
            }
        };

        self.last_error = None;
        match sequencer.submit(session, &amount, action).await {
            Ok(_) => {
                self.tx_done = true;
                self.updating_balance = true;
                match reader.get_balance(session, Token::HiIq).await {
                    Ok(locked) => self.locked_balance = Some(locked),
                    Err(e) => self.last_error = Some(e.user_message()),
                }
                self.updating_balance = false;
                true
            }
            Err(e) => {
                self.tx_done = false;
                self.last_error = Some(e.user_message());
                false
            }
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if self.account.is_some() && self.tx_done {
            alerts.push(Alert::TxExecuted);
        }
        if self.account.is_none() {
            alerts.push(Alert::LoginRequired);
        }
        if let Some(message) = &self.last_error {
            alerts.push(Alert::Error(message.clone()));
        }
        alerts
    }

    pub fn tx_done(&self) -> bool {
        self.tx_done
    }

    pub fn is_updating_balance(&self) -> bool {
        self.updating_balance
    }

    pub fn is_loading_balance(&self) -> bool {
        self.loading_balance
    }

    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    pub fn locked_balance(&self) -> Option<&str> {
        self.locked_balance.as_deref()
    }

    pub fn lock_days(&self) -> u32 {
        self.lock_days
    }

    pub fn wrong_chain_prompt(&self) -> bool {
        self.wrong_chain_prompt
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
