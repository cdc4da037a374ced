//! Owl - Rust 盯盘智能体
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、置信度闸门、行动规划、会话恢复、主控循环、关闭处理
//! - **forecast**: 预测服务抽象与实现（OpenAI 兼容 / Mock）
//! - **session**: 交易页面会话抽象与实现（Chrome / Mock）
//! - **store**: 快照落盘与决策日志

pub mod config;
pub mod core;
pub mod forecast;
pub mod session;
pub mod store;
