//! 预测服务抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 ForecastBackend：提交截图字节，返回原始响应。
//! 解析与容错（文本 JSON 优先、结构化负载兜底）统一放在 ForecastClient。

use async_trait::async_trait;
use thiserror::Error;

/// 预测服务错误
#[derive(Error, Debug)]
pub enum ForecastError {
    /// 请求未能完成（网络、鉴权、读取截图等）
    #[error("Forecast request failed: {0}")]
    Request(String),

    /// 服务返回了空响应
    #[error("Empty forecast response")]
    EmptyResponse,

    /// 文本与结构化形式均无法解析；raw 保留原始响应供排查
    #[error("Unparseable forecast response: {raw}")]
    Unparseable { raw: String },
}

/// 后端原始响应：文本 JSON 与（部分 SDK 会直接给出的）结构化负载
///
/// 两者至少一项存在；同一逻辑响应的两种编码都必须被接受。
#[derive(Debug, Clone, Default)]
pub struct RawForecast {
    pub text: Option<String>,
    pub structured: Option<serde_json::Value>,
}

impl RawForecast {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            structured: None,
        }
    }

    pub fn from_structured(value: serde_json::Value) -> Self {
        Self {
            text: None,
            structured: Some(value),
        }
    }
}

/// 预测后端 trait：提交一张 JPEG 截图，返回服务的原始响应
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    async fn analyze_image(&self, image: &[u8]) -> Result<RawForecast, ForecastError>;
}
