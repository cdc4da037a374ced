//! 置信度闸门：对预测做结构与阈值校验，决定接受或放行跳过
//!
//! 校验顺序：方向必须严格为 "BUY"/"SELL" -> 置信度必须落在 [0,1] -> 置信度达到阈值。
//! 拒绝是常态而非故障：只记 info 日志，不计入失败计数。

use crate::forecast::{Prediction, TradeDirection};

/// 闸门拒绝原因（良性结果，不是错误）
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// 方向不是严格的 "BUY"/"SELL"（含空串与大小写不符）
    InvalidDirection(String),
    /// 置信度不在 [0,1]
    InvalidConfidence(f64),
    /// 置信度合法但未达阈值
    BelowThreshold { confidence: f64, threshold: f64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::InvalidDirection(dir) => write!(f, "invalid direction {:?}", dir),
            RejectReason::InvalidConfidence(c) => write!(f, "invalid confidence {}", c),
            RejectReason::BelowThreshold {
                confidence,
                threshold,
            } => write!(f, "confidence {} below threshold {}", confidence, threshold),
        }
    }
}

/// 闸门结论
#[derive(Debug)]
pub enum GateDecision {
    /// 通过：携带预测与解析好的方向
    Accept {
        prediction: Prediction,
        direction: TradeDirection,
    },
    Reject(RejectReason),
}

/// 置信度闸门：阈值为配置常量（默认 0.8）
pub struct ConfidenceGate {
    threshold: f64,
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 校验一条预测；规则按序应用，先命中者定结论
    pub fn evaluate(&self, prediction: Prediction) -> GateDecision {
        let direction = match TradeDirection::from_wire(&prediction.direction) {
            Some(d) => d,
            None => {
                return GateDecision::Reject(RejectReason::InvalidDirection(
                    prediction.direction.clone(),
                ))
            }
        };

        let confidence = prediction.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return GateDecision::Reject(RejectReason::InvalidConfidence(confidence));
        }

        if confidence < self.threshold {
            return GateDecision::Reject(RejectReason::BelowThreshold {
                confidence,
                threshold: self.threshold,
            });
        }

        GateDecision::Accept {
            prediction,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(direction: &str, confidence: f64) -> Prediction {
        Prediction {
            current_value: 1.085,
            forecast: 1.086,
            confidence,
            current_time: "00:02:30".to_string(),
            expiration_time: "00:03:00".to_string(),
            direction: direction.to_string(),
        }
    }

    #[test]
    fn test_accepts_at_or_above_threshold() {
        let gate = ConfidenceGate::new(0.8);
        assert!(matches!(
            gate.evaluate(prediction("BUY", 0.9)),
            GateDecision::Accept {
                direction: TradeDirection::Buy,
                ..
            }
        ));
        // 阈值本身算通过
        assert!(matches!(
            gate.evaluate(prediction("SELL", 0.8)),
            GateDecision::Accept {
                direction: TradeDirection::Sell,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_below_threshold() {
        let gate = ConfidenceGate::new(0.8);
        match gate.evaluate(prediction("SELL", 0.5)) {
            GateDecision::Reject(RejectReason::BelowThreshold {
                confidence,
                threshold,
            }) => {
                assert_eq!(confidence, 0.5);
                assert_eq!(threshold, 0.8);
            }
            other => panic!("Expected BelowThreshold, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_direction() {
        let gate = ConfidenceGate::new(0.8);
        for dir in ["buy", "Sell", "HOLD", ""] {
            assert!(
                matches!(
                    gate.evaluate(prediction(dir, 0.9)),
                    GateDecision::Reject(RejectReason::InvalidDirection(_))
                ),
                "direction {:?} should be rejected",
                dir
            );
        }
    }

    #[test]
    fn test_rejects_confidence_out_of_range_regardless_of_direction() {
        let gate = ConfidenceGate::new(0.8);
        for conf in [-0.1, 1.2, f64::NAN] {
            assert!(matches!(
                gate.evaluate(prediction("BUY", conf)),
                GateDecision::Reject(RejectReason::InvalidConfidence(_))
            ));
        }
    }

    #[test]
    fn test_direction_checked_before_confidence() {
        let gate = ConfidenceGate::new(0.8);
        // 方向与置信度同时非法时，按顺序先报方向
        assert!(matches!(
            gate.evaluate(prediction("HOLD", 1.5)),
            GateDecision::Reject(RejectReason::InvalidDirection(_))
        ));
    }
}
