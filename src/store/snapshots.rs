//! 快照存储：每轮迭代截一张图并落盘
//!
//! 文件名由捕获时刻的毫秒时间戳派生（screen_<millis>.jpg），在配置的节奏下
//! 足以保证不冲突。只增不删，淘汰不在此层职责内。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::session::{SessionError, TradingSession};

/// 一次捕获的结果：标识、捕获时刻与落盘位置。创建后不可变。
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub path: PathBuf,
}

/// 快照存储：向会话要一张截图并写入快照目录
///
/// 无重试逻辑：会话不可达或写盘失败原样上抛给调用方。
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 截图并落盘，返回新快照
    pub async fn capture(&self, session: &dyn TradingSession) -> Result<Snapshot, SessionError> {
        let bytes = session.capture().await?;

        let captured_at = Utc::now();
        let id = format!("screen_{}", captured_at.timestamp_millis());
        let path = self.root.join(format!("{}.jpg", id));

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SessionError::Capture(format!("Create snapshot dir failed: {}", e)))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| SessionError::Capture(format!("Write snapshot failed: {}", e)))?;

        Ok(Snapshot {
            id,
            captured_at,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockSession;

    #[tokio::test]
    async fn test_capture_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("screens"));
        let session = MockSession::new();

        let snapshot = store.capture(&session).await.unwrap();
        assert!(snapshot.id.starts_with("screen_"));
        assert!(snapshot.path.exists());
        let bytes = std::fs::read(&snapshot.path).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[tokio::test]
    async fn test_capture_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let session = MockSession::new();
        session.state().lock().unwrap().fail_captures(1);

        let err = store.capture(&session).await.unwrap_err();
        assert!(matches!(err, SessionError::Capture(_)));
    }
}
