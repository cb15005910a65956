//! iqbridge - IQ 代币锁仓与 pIQ 兑换服务
//!
//! approve → mint / lock / increase_amount 两步交易序列，余额查询，锁仓页面状态与 HTTP API

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod error_body;
pub mod infrastructure;
pub mod service;

// 重新导出常用类型
pub use app_state::AppState;
pub use error::{AppError, AppErrorCode};

pub mod prelude {
    pub use crate::{
        app_state::AppState,
        domain::{Deployment, LockError, TokenAmount, WalletSession},
        error::{AppError, AppErrorCode},
        service::{BalanceReader, ChainClient, LockAction, TokenTxSequencer},
    };
}
