//! Mock 预测后端（用于测试，无需 API）
//!
//! 按队列返回脚本化响应；队列为空时返回一条高置信度 BUY，便于本地跑通主循环。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::forecast::{ForecastBackend, ForecastError, RawForecast};

/// Mock 后端：依次弹出预设响应
#[derive(Clone, Default)]
pub struct MockForecastBackend {
    replies: Arc<Mutex<VecDeque<Result<RawForecast, String>>>>,
}

impl MockForecastBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预设一条成功响应
    pub fn push_reply(&self, raw: RawForecast) {
        self.replies.lock().unwrap().push_back(Ok(raw));
    }

    /// 预设一条请求失败
    pub fn push_failure(&self, msg: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(msg.into()));
    }

    /// 构造一条六字段文本响应的便捷方法
    pub fn text_reply(direction: &str, confidence: f64) -> RawForecast {
        RawForecast::from_text(format!(
            r#"{{"currentValue": 1.085, "forecast": 1.086, "confident": {confidence}, "currentTime": "00:02:30", "expirationTime": "00:03:00", "result": "{direction}"}}"#
        ))
    }
}

#[async_trait]
impl ForecastBackend for MockForecastBackend {
    async fn analyze_image(&self, _image: &[u8]) -> Result<RawForecast, ForecastError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(msg)) => Err(ForecastError::Request(msg)),
            None => Ok(Self::text_reply("BUY", 0.9)),
        }
    }
}
