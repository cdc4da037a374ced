//! Owl - Rust 盯盘智能体
//!
//! 入口：初始化日志、加载配置、组装主控循环并运行到收到中断信号。

use std::sync::Arc;

use anyhow::Context;
use owl::config::{load_config, AppConfig};
use owl::core::{create_scheduler, ShutdownManager};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let mut scheduler = create_scheduler(&cfg, shutdown.token());

    // 中断信号：记一行日志立即退出，不等进行中的迭代；启动期故障以非零码退出
    tokio::select! {
        result = scheduler.run() => {
            result.context("Watch loop failed")?;
        }
        _ = shutdown.wait_for_shutdown() => {
            tracing::info!("Stopping gracefully...");
        }
    }

    Ok(())
}
