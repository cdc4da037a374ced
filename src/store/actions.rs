//! 决策日志：已接受决策的持久化投影
//!
//! 追加写的 JSONL 文件，一行一条已接受决策；只追加，本系统永不截断或改写。
//! 这份日志是「系统决定了什么」的权威记录，与 UI 点击是否成功无关。

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forecast::Prediction;

/// 一条已接受决策（字段名沿用线上格式）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    /// 决策落盘时刻（ISO-8601）
    pub ts: String,

    #[serde(rename = "result")]
    pub direction: String,

    #[serde(rename = "confident")]
    pub confidence: f64,

    #[serde(rename = "currentValue")]
    pub current_value: f64,

    pub forecast: f64,

    #[serde(rename = "currentTime")]
    pub current_time: String,

    #[serde(rename = "expirationTime")]
    pub expiration_time: String,
}

impl PlannedAction {
    /// 由已接受的预测加当前墙钟时间生成一条记录
    pub fn from_prediction(prediction: &Prediction, ts: DateTime<Utc>) -> Self {
        Self {
            ts: ts.to_rfc3339(),
            direction: prediction.direction.clone(),
            confidence: prediction.confidence,
            current_value: prediction.current_value,
            forecast: prediction.forecast,
            current_time: prediction.current_time.clone(),
            expiration_time: prediction.expiration_time.clone(),
        }
    }
}

/// 追加写的决策日志
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条决策；必须成功（或大声失败），之后才允许尝试 UI 交互
    pub fn append(&self, action: &PlannedAction) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let line = serde_json::to_string(action)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }

    /// 按写入顺序回放全部决策
    pub fn replay(&self) -> std::io::Result<Vec<PlannedAction>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prediction(direction: &str, confidence: f64) -> Prediction {
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
    fn test_append_and_replay_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActionLog::new(dir.path().join("planned_actions.jsonl"));

        let first = PlannedAction::from_prediction(&sample_prediction("BUY", 0.9), Utc::now());
        let second = PlannedAction::from_prediction(&sample_prediction("SELL", 0.82), Utc::now());
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let replayed = log.replay().unwrap();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].direction, "BUY");
        assert_eq!(replayed[1].direction, "SELL");
        assert_eq!(replayed[1].confidence, 0.82);
    }

    #[test]
    fn test_append_uses_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActionLog::new(dir.path().join("planned_actions.jsonl"));
        log.append(&PlannedAction::from_prediction(
            &sample_prediction("BUY", 0.9),
            Utc::now(),
        ))
        .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        for key in [
            "ts",
            "result",
            "confident",
            "currentValue",
            "forecast",
            "currentTime",
            "expirationTime",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_append_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planned_actions.jsonl");

        let log = ActionLog::new(&path);
        log.append(&PlannedAction::from_prediction(
            &sample_prediction("BUY", 0.9),
            Utc::now(),
        ))
        .unwrap();

        // 重新打开同一文件追加，不得丢失已有记录
        let reopened = ActionLog::new(&path);
        reopened
            .append(&PlannedAction::from_prediction(
                &sample_prediction("SELL", 0.85),
                Utc::now(),
            ))
            .unwrap();

        assert_eq!(reopened.replay().unwrap().len(), 2);
    }

    #[test]
    fn test_replay_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActionLog::new(dir.path().join("nope.jsonl"));
        assert!(log.replay().unwrap().is_empty());
    }
}
