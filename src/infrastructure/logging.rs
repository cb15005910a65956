//! 日志系统配置模块
//! 支持 JSON 结构化日志和文本日志，级别可由 RUST_LOG 覆盖

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

/// 初始化日志系统
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()
            .context("Failed to install JSON log subscriber")?;
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_target(true)
                    .with_ansi(true),
            )
            .try_init()
            .context("Failed to install text log subscriber")?;
    }

    Ok(())
}

/// 配置加载失败前使用的默认日志
pub fn init_default_logging() {
    let _ = Registry::default()
        .with(build_filter("info"))
        .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()))
        .try_init();
}

/// RUST_LOG 优先，其次是配置的级别；依赖库的 debug 日志默认压低
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},iqbridge={level},tower_http=info,ethers_providers=warn,hyper=warn"
        ))
    })
}
