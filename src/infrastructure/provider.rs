//! 钱包连接
//! 用配置中的 RPC 和私钥建立签名会话

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
};

use crate::{
    config::Config,
    domain::WalletSession,
    service::chain_client::{ChainClient, EthersChainClient},
};

/// 未配置私钥 → Disconnected；节点不可达或链不匹配 → Error（无签名能力）
pub async fn connect_wallet(config: &Config) -> Result<WalletSession> {
    let Some(private_key) = config.wallet.private_key.as_deref() else {
        tracing::info!("No wallet private key configured, running without a signer");
        return Ok(WalletSession::disconnected());
    };

    let wallet = LocalWallet::from_str(private_key.trim_start_matches("0x"))
        .context("Failed to parse wallet private key")?;
    let account = wallet.address();

    let provider = Provider::<Http>::try_from(config.network.rpc_url.as_str())
        .context("Failed to create Ethereum provider")?
        .interval(Duration::from_millis(2_000));

    let chain_id = match provider.get_chainid().await {
        Ok(id) => id.as_u64(),
        Err(e) => {
            tracing::error!(
                rpc_url = %config.network.rpc_url,
                error = %e,
                "Failed to query chain id from provider"
            );
            return Ok(WalletSession::errored(Some(account), None));
        }
    };

    if chain_id != config.network.chain_id {
        tracing::warn!(
            expected = config.network.chain_id,
            actual = chain_id,
            "Provider is connected to an unsupported network"
        );
        return Ok(WalletSession::errored(Some(account), Some(chain_id)));
    }

    let signer = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));
    let client: Arc<dyn ChainClient> = Arc::new(EthersChainClient::new(
        Arc::new(signer),
        config.transaction.confirmations,
    ));

    tracing::info!(account = ?account, chain_id, "Wallet connected");
    Ok(WalletSession::connected(account, chain_id, client))
}
