//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{path::Path, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::deployment::POLYGON_CHAIN_ID;

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub transaction: TransactionConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 链配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub network_name: String,
    pub rpc_url: String,
}

/// 合约地址（未配置时使用内置部署地址）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub iq_token: Option<String>,
    pub hiiq_locker: Option<String>,
    pub ptoken: Option<String>,
    pub ptoken_minter: Option<String>,
    pub token_decimals: u32,
}

/// Gas 配置：估算失败时的降级值 + 估算值的安全余量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    pub approve_gas_limit: u64,
    pub action_gas_limit: u64,
    pub bump_percent: u32,
}

/// 交易确认配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    pub confirmations: usize,
    pub step_timeout_secs: u64,
}

/// 签名钱包配置
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    pub private_key: Option<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 私钥不进日志
        f.debug_struct("WalletConfig")
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".into()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: env_parse("CHAIN_ID").unwrap_or(POLYGON_CHAIN_ID),
            network_name: std::env::var("NETWORK_NAME").unwrap_or_else(|_| "polygon".into()),
            rpc_url: std::env::var("RPC_URL").unwrap_or_else(|_| "https://polygon-rpc.com".into()),
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            iq_token: std::env::var("IQ_TOKEN_ADDRESS").ok(),
            hiiq_locker: std::env::var("HIIQ_ADDRESS").ok(),
            ptoken: std::env::var("PIQ_TOKEN_ADDRESS").ok(),
            ptoken_minter: std::env::var("PIQ_MINTER_ADDRESS").ok(),
            token_decimals: env_parse("TOKEN_DECIMALS").unwrap_or(18),
        }
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            approve_gas_limit: env_parse("APPROVE_GAS_LIMIT").unwrap_or(70_000),
            action_gas_limit: env_parse("ACTION_GAS_LIMIT").unwrap_or(125_000),
            bump_percent: env_parse("GAS_BUMP_PERCENT").unwrap_or(20),
        }
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            confirmations: env_parse("TX_CONFIRMATIONS").unwrap_or(1),
            step_timeout_secs: env_parse("TX_STEP_TIMEOUT_SECS").unwrap_or(180),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            network: NetworkConfig::default(),
            contracts: ContractsConfig::default(),
            gas: GasConfig::default(),
            transaction: TransactionConfig::default(),
            wallet: WalletConfig {
                private_key: std::env::var("WALLET_PRIVATE_KEY").ok(),
            },
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                let mut file_config = Self::from_file(path)?;
                // 配置文件未写私钥时沿用环境变量
                if file_config.wallet.private_key.is_none() {
                    file_config.wallet.private_key = config.wallet.private_key.take();
                }
                config = file_config;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        if !self.network.rpc_url.starts_with("http://")
            && !self.network.rpc_url.starts_with("https://")
        {
            anyhow::bail!("RPC_URL must start with http:// or https://");
        }

        if self.contracts.token_decimals > 77 {
            anyhow::bail!("TOKEN_DECIMALS must not exceed 77");
        }

        if self.transaction.step_timeout_secs == 0 {
            anyhow::bail!("TX_STEP_TIMEOUT_SECS must be greater than zero");
        }

        // 合约地址可解析，且当前链有完整的部署信息
        crate::domain::Deployment::from_config(&self.network, &self.contracts)
            .context("Invalid contract configuration")?;

        Ok(())
    }
}
