//! 迭代级错误类型
//!
//! 主循环在迭代边界捕获 BotError 并交给恢复管理器计数；闸门拒绝不是错误，
//! 不在此枚举中（见 core::gate::RejectReason）。

use thiserror::Error;

/// 一轮迭代可能出现的故障（截图、预测服务、日志落盘、恢复、启动）
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Forecast service failed: {0}")]
    ForecastService(String),

    #[error("Decision journal write failed: {0}")]
    Journal(String),

    #[error("Session recovery failed: {0}")]
    Recovery(String),

    /// 启动期故障（初始导航/登录等待）是致命的，进程以非零码退出
    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Config error: {0}")]
    Config(String),
}
