pub mod balance_reader;
pub mod chain_client;
pub mod gas_estimator;
pub mod lock_flow;
pub mod tx_sequencer;

pub use balance_reader::{BalanceReader, Balances};
pub use chain_client::{ChainClient, ChainError, EthersChainClient, TokenCall, TxReceiptSummary};
pub use gas_estimator::GasEstimator;
pub use lock_flow::{Alert, LockFlow, LockSummary};
pub use tx_sequencer::{LockAction, TokenTxSequencer, TxOutcome};
