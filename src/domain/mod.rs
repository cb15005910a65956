//! Domain 模块
//!
//! 代币数量、钱包会话、合约部署与锁仓规则

pub mod deployment;
pub mod lock_error;
pub mod lock_period;
pub mod token_amount;
pub mod transaction_status;
pub mod wallet_session;

// 重新导出常用类型
pub use deployment::{Deployment, Token};
pub use lock_error::{LockError, TxStep};
pub use lock_period::{estimate_hiiq, LockPeriod};
pub use token_amount::{format_units, parse_units, AmountError, TokenAmount};
pub use transaction_status::SubmissionStatus;
pub use wallet_session::{WalletSession, WalletStatus};
