//! 核心编排层：错误、置信度闸门、行动规划、会话恢复、主控循环、关闭处理

pub mod error;
pub mod gate;
pub mod planner;
pub mod recovery;
pub mod scheduler;
pub mod shutdown;

pub use error::BotError;
pub use gate::{ConfidenceGate, GateDecision, RejectReason};
pub use planner::ActionPlanner;
pub use recovery::{RecoveryManager, RecoveryOutcome, RecoveryState};
pub use scheduler::{create_scheduler, IterationOutcome, LoopScheduler, SchedulerTiming};
pub use shutdown::{ShutdownManager, ShutdownReason};
