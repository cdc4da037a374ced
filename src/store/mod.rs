//! 存储层：快照落盘与决策日志

pub mod actions;
pub mod snapshots;

pub use actions::{ActionLog, PlannedAction};
pub use snapshots::{Snapshot, SnapshotStore};
