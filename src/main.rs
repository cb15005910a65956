//! iqbridge 主入口

use std::sync::Arc;

use anyhow::{Context, Result};
use iqbridge::{
    api,
    app_state::AppState,
    config::Config,
    infrastructure::{logging, provider},
};

#[tokio::main]
async fn main() -> Result<()> {
    // ✅ 1. 加载环境变量
    dotenvy::dotenv().ok();

    // ✅ 2. 加载配置（CONFIG_PATH 指定的文件优先）
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = match Config::from_env_and_file(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_default_logging();
            tracing::error!(error = ?e, "Failed to load configuration");
            return Err(e);
        }
    };

    // ✅ 3. 初始化日志
    logging::init_logging(&config.logging)?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        chain_id = config.network.chain_id,
        network = %config.network.network_name,
        "🚀 Starting iqbridge"
    );

    // ✅ 4. 连接钱包
    let session = provider::connect_wallet(&config).await?;
    tracing::info!(status = session.status().as_str(), "Wallet session ready");

    // ✅ 5. 初始化应用状态
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone(), session)?);

    // ✅ 6. 启动 HTTP 服务
    let app = api::routes(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!("🎉 Server listening on http://{}", config.server.bind_addr);
    tracing::info!(
        "📖 OpenAPI: http://{}/api/openapi.json",
        config.server.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
