//! 预测结果类型
//!
//! Prediction 对应服务端六字段 JSON（字段名沿用线上格式，serde rename 映射），
//! 反序列化即完成「字段齐全且类型正确」校验；数值范围与方向合法性由置信度闸门负责。

use serde::{Deserialize, Serialize};

/// 预测方向（闸门校验通过后的强类型形式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// 线上取值严格为 "BUY" / "SELL"（区分大小写），其余一律拒绝
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(TradeDirection::Buy),
            "SELL" => Some(TradeDirection::Sell),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "BUY",
            TradeDirection::Sell => "SELL",
        }
    }
}

/// 预测服务对单张截图的结构化输出
///
/// 六个字段缺一不可：缺字段或类型不符会让反序列化失败，按服务故障处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// 截图中资产的当前价格
    #[serde(rename = "currentValue")]
    pub current_value: f64,

    /// 到期时刻的短期价格预测
    pub forecast: f64,

    /// 方向预测的置信度，期望范围 [0,1]
    #[serde(rename = "confident")]
    pub confidence: f64,

    /// 距当前 K 线/交易关闭的剩余时间
    #[serde(rename = "currentTime")]
    pub current_time: String,

    /// 到期时间
    #[serde(rename = "expirationTime")]
    pub expiration_time: String,

    /// 方向预测，期望为 "BUY" 或 "SELL"
    #[serde(rename = "result")]
    pub direction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_wire() {
        assert_eq!(TradeDirection::from_wire("BUY"), Some(TradeDirection::Buy));
        assert_eq!(TradeDirection::from_wire("SELL"), Some(TradeDirection::Sell));
        assert_eq!(TradeDirection::from_wire("buy"), None);
        assert_eq!(TradeDirection::from_wire("HOLD"), None);
        assert_eq!(TradeDirection::from_wire(""), None);
    }

    #[test]
    fn test_prediction_wire_field_names() {
        let json = r#"{
            "currentValue": 1.2345,
            "forecast": 1.2360,
            "confident": 0.9,
            "currentTime": "00:02:30",
            "expirationTime": "00:03:00",
            "result": "BUY"
        }"#;
        let p: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(p.current_value, 1.2345);
        assert_eq!(p.confidence, 0.9);
        assert_eq!(p.direction, "BUY");
    }

    #[test]
    fn test_prediction_missing_field_fails() {
        // forecast 缺失
        let json = r#"{
            "currentValue": 1.2345,
            "confident": 0.9,
            "currentTime": "00:02:30",
            "expirationTime": "00:03:00",
            "result": "BUY"
        }"#;
        assert!(serde_json::from_str::<Prediction>(json).is_err());
    }

    #[test]
    fn test_prediction_wrong_type_fails() {
        // confident 不是数字
        let json = r#"{
            "currentValue": 1.2345,
            "forecast": 1.2360,
            "confident": "high",
            "currentTime": "00:02:30",
            "expirationTime": "00:03:00",
            "result": "BUY"
        }"#;
        assert!(serde_json::from_str::<Prediction>(json).is_err());
    }
}
