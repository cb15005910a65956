//! 合约部署配置
//!
//! 每条链上 IQ / hiIQ / pIQ / pIQ Minter 的合约地址。

use std::{collections::HashMap, str::FromStr};

use anyhow::{Context, Result};
use ethers::types::Address;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::token_amount::DEFAULT_DECIMALS;
use crate::config::{ContractsConfig, NetworkConfig};

pub const POLYGON_CHAIN_ID: u64 = 137;

/// 支持查询余额的代币
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    /// 可锁仓的 IQ
    Iq,
    /// 锁仓凭证 hiIQ
    HiIq,
    /// 跨链桥映射的 pIQ
    PIq,
}

impl Token {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Iq => "IQ",
            Self::HiIq => "hiIQ",
            Self::PIq => "pIQ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub network_name: String,
    pub decimals: u32,
    pub iq_token: Address,
    pub hiiq_locker: Address,
    pub ptoken: Address,
    pub ptoken_minter: Address,
}

struct KnownDeployment {
    network_name: &'static str,
    iq_token: &'static str,
    hiiq_locker: &'static str,
    ptoken: &'static str,
    ptoken_minter: &'static str,
}

static KNOWN_DEPLOYMENTS: Lazy<HashMap<u64, KnownDeployment>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        POLYGON_CHAIN_ID,
        KnownDeployment {
            network_name: "polygon",
            iq_token: "0xB9638272aD6998708de56BBC0A290a1dE534a578",
            hiiq_locker: "0xfC0fA725E8fB4D87c38EcE56e8852258219C64Ee",
            ptoken: "0xa23d33d5e0a61ba81919bfd727c671bb03ab0fea",
            ptoken_minter: "0x30953aebf5e3f2c139e9e19bf246dd3a575ddaf7",
        },
    );
    map
});

fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .with_context(|| format!("Invalid contract address for {}: {}", field, value))
}

impl Deployment {
    /// 内置部署（当前仅 Polygon）
    pub fn known(chain_id: u64) -> Option<Self> {
        let known = KNOWN_DEPLOYMENTS.get(&chain_id)?;
        Some(Self {
            chain_id,
            network_name: known.network_name.to_string(),
            decimals: DEFAULT_DECIMALS,
            iq_token: parse_address("iq_token", known.iq_token).ok()?,
            hiiq_locker: parse_address("hiiq_locker", known.hiiq_locker).ok()?,
            ptoken: parse_address("ptoken", known.ptoken).ok()?,
            ptoken_minter: parse_address("ptoken_minter", known.ptoken_minter).ok()?,
        })
    }

    /// 从配置构建，配置中的地址优先于内置地址
    pub fn from_config(network: &NetworkConfig, contracts: &ContractsConfig) -> Result<Self> {
        let fallback = Self::known(network.chain_id);

        let pick = |field: &str,
                    configured: &Option<String>,
                    builtin: Option<Address>|
         -> Result<Address> {
            match configured {
                Some(value) => parse_address(field, value),
                None => builtin.with_context(|| {
                    format!(
                        "No built-in {} address for chain {}, configure it explicitly",
                        field, network.chain_id
                    )
                }),
            }
        };

        Ok(Self {
            chain_id: network.chain_id,
            network_name: network.network_name.clone(),
            decimals: contracts.token_decimals,
            iq_token: pick(
                "iq_token",
                &contracts.iq_token,
                fallback.as_ref().map(|d| d.iq_token),
            )?,
            hiiq_locker: pick(
                "hiiq_locker",
                &contracts.hiiq_locker,
                fallback.as_ref().map(|d| d.hiiq_locker),
            )?,
            ptoken: pick(
                "ptoken",
                &contracts.ptoken,
                fallback.as_ref().map(|d| d.ptoken),
            )?,
            ptoken_minter: pick(
                "ptoken_minter",
                &contracts.ptoken_minter,
                fallback.as_ref().map(|d| d.ptoken_minter),
            )?,
        })
    }

    pub fn token_address(&self, token: Token) -> Address {
        match token {
            Token::Iq => self.iq_token,
            Token::HiIq => self.hiiq_locker,
            Token::PIq => self.ptoken,
        }
    }
}
