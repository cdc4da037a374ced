//! 预测客户端：提交截图并把原始响应解析为 Prediction
//!
//! 解析顺序：文本 JSON 优先；失败时若后端给出了结构化负载则兜底接受；
//! 两者都不行时报 Unparseable 并保留原始响应。字段缺失/类型不符在这里暴露，
//! 数值范围与方向合法性留给置信度闸门。

use std::sync::Arc;

use crate::forecast::{ForecastBackend, ForecastError, Prediction, RawForecast};
use crate::store::Snapshot;

/// 预测客户端：读取快照文件、调用后端、解析响应
pub struct ForecastClient {
    backend: Arc<dyn ForecastBackend>,
}

impl ForecastClient {
    pub fn new(backend: Arc<dyn ForecastBackend>) -> Self {
        Self { backend }
    }

    /// 分析一张快照，返回结构化预测
    pub async fn analyze(&self, snapshot: &Snapshot) -> Result<Prediction, ForecastError> {
        let image = tokio::fs::read(&snapshot.path)
            .await
            .map_err(|e| ForecastError::Request(format!("Read snapshot failed: {}", e)))?;

        let raw = self.backend.analyze_image(&image).await?;
        parse_forecast(raw)
    }
}

/// 把后端原始响应解析为 Prediction
pub fn parse_forecast(raw: RawForecast) -> Result<Prediction, ForecastError> {
    if let Some(text) = raw.text {
        if let Ok(prediction) = serde_json::from_str::<Prediction>(&text) {
            return Ok(prediction);
        }
        // 部分 SDK/端点会直接给出结构化对象，文本解析失败时兜底
        if let Some(value) = raw.structured {
            if let Ok(prediction) = serde_json::from_value::<Prediction>(value) {
                return Ok(prediction);
            }
        }
        return Err(ForecastError::Unparseable { raw: text });
    }

    if let Some(value) = raw.structured {
        let raw_repr = value.to_string();
        return serde_json::from_value::<Prediction>(value)
            .map_err(|_| ForecastError::Unparseable { raw: raw_repr });
    }

    Err(ForecastError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::MockForecastBackend;
    use serde_json::json;

    fn valid_json_text() -> String {
        r#"{"currentValue": 1.085, "forecast": 1.086, "confident": 0.9, "currentTime": "00:02:30", "expirationTime": "00:03:00", "result": "BUY"}"#.to_string()
    }

    fn valid_structured() -> serde_json::Value {
        json!({
            "currentValue": 1.085,
            "forecast": 1.084,
            "confident": 0.75,
            "currentTime": "00:01:30",
            "expirationTime": "00:02:00",
            "result": "SELL"
        })
    }

    #[test]
    fn test_parse_text_json() {
        let prediction = parse_forecast(RawForecast::from_text(valid_json_text())).unwrap();
        assert_eq!(prediction.direction, "BUY");
        assert_eq!(prediction.confidence, 0.9);
    }

    #[test]
    fn test_parse_falls_back_to_structured() {
        let raw = RawForecast {
            text: Some("not json at all".to_string()),
            structured: Some(valid_structured()),
        };
        let prediction = parse_forecast(raw).unwrap();
        assert_eq!(prediction.direction, "SELL");
    }

    #[test]
    fn test_parse_structured_only() {
        let prediction = parse_forecast(RawForecast::from_structured(valid_structured())).unwrap();
        assert_eq!(prediction.confidence, 0.75);
    }

    #[test]
    fn test_parse_unparseable_keeps_raw() {
        let err = parse_forecast(RawForecast::from_text("garbage")).unwrap_err();
        match err {
            ForecastError::Unparseable { raw } => assert_eq!(raw, "garbage"),
            other => panic!("Expected Unparseable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_field_is_service_fault() {
        // forecast 字段缺失：按服务故障处理，而不是闸门拒绝
        let text = r#"{"currentValue": 1.085, "confident": 0.9, "currentTime": "00:02:30", "expirationTime": "00:03:00", "result": "BUY"}"#;
        let err = parse_forecast(RawForecast::from_text(text)).unwrap_err();
        assert!(matches!(err, ForecastError::Unparseable { .. }));
    }

    #[test]
    fn test_parse_empty_response() {
        let err = parse_forecast(RawForecast::default()).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_analyze_reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen_1.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        let snapshot = Snapshot {
            id: "screen_1".to_string(),
            captured_at: chrono::Utc::now(),
            path,
        };

        let backend = MockForecastBackend::new();
        backend.push_reply(MockForecastBackend::text_reply("BUY", 0.85));
        let client = ForecastClient::new(std::sync::Arc::new(backend));

        let prediction = client.analyze(&snapshot).await.unwrap();
        assert_eq!(prediction.direction, "BUY");
        assert_eq!(prediction.confidence, 0.85);
    }

    #[tokio::test]
    async fn test_analyze_missing_file_is_request_fault() {
        let snapshot = Snapshot {
            id: "screen_gone".to_string(),
            captured_at: chrono::Utc::now(),
            path: std::path::PathBuf::from("/nonexistent/screen_gone.jpg"),
        };
        let client = ForecastClient::new(std::sync::Arc::new(MockForecastBackend::new()));
        let err = client.analyze(&snapshot).await.unwrap_err();
        assert!(matches!(err, ForecastError::Request(_)));
    }
}
