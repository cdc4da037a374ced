//! 会话恢复状态机：Normal -> SoftRecovery -> HardRecovery
//!
//! 连续失败计数达到阈值时先软恢复（有界超时内原地重载页面）；重载失败则硬恢复
//! （丢弃旧会话、由工厂新开会话并重新导航，再等一段固定时间供人工重新登录）；
//! 硬恢复也失败时记录错误并沿用现有会话引用，等下一轮失败周期再试。
//! 不区分故障种类：截图、预测服务或其它迭代级故障对计数器一视同仁。

use std::time::Duration;

use crate::core::BotError;
use crate::session::{SessionFactory, TradingSession};

/// 恢复状态：连续失败计数（进程生命周期内有效，不跨重启持久化）
#[derive(Debug, Default, Clone, Copy)]
pub struct RecoveryState {
    pub consecutive_failures: u32,
}

/// 一次失败处理的结论（日志与测试用）
#[derive(Debug)]
pub enum RecoveryOutcome {
    /// 未达阈值，仅累加计数
    Counted(u32),
    /// 软恢复成功（页面已原地重载）
    SoftRecovered,
    /// 硬恢复成功（会话已替换为新会话）
    HardRecovered,
    /// 软硬恢复均失败，沿用原会话
    Failed(BotError),
}

/// 恢复管理器：持有计数器并在阈值处发起升级
pub struct RecoveryManager {
    state: RecoveryState,
    max_consecutive: u32,
    reload_timeout: Duration,
    settle_delay: Duration,
}

impl RecoveryManager {
    pub fn new(max_consecutive: u32, reload_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            state: RecoveryState::default(),
            max_consecutive,
            reload_timeout,
            settle_delay,
        }
    }

    /// 当前连续失败数
    pub fn failures(&self) -> u32 {
        self.state.consecutive_failures
    }

    /// 成功迭代（含闸门拒绝）：计数清零
    pub fn record_success(&mut self) {
        self.state.consecutive_failures = 0;
    }

    /// 失败迭代：累加计数，达到阈值时立即清零并升级恢复
    ///
    /// 升级路径中 session 可能被替换；无论结局如何，状态机都回到 Normal，
    /// 下一轮迭代照常开始。
    pub async fn record_failure(
        &mut self,
        session: &mut Box<dyn TradingSession>,
        factory: &dyn SessionFactory,
    ) -> RecoveryOutcome {
        self.state.consecutive_failures += 1;
        if self.state.consecutive_failures < self.max_consecutive {
            return RecoveryOutcome::Counted(self.state.consecutive_failures);
        }

        // 升级触发即清零：每次越过阈值恰好引发一次恢复
        self.state.consecutive_failures = 0;
        tracing::warn!("Too many consecutive errors, soft-reloading page...");

        let reload_result = tokio::time::timeout(self.reload_timeout, session.reload()).await;
        match reload_result {
            Ok(Ok(())) => RecoveryOutcome::SoftRecovered,
            Ok(Err(e)) => {
                tracing::warn!("Page reload failed ({}), attempting new session...", e);
                self.hard_recover(session, factory).await
            }
            Err(_) => {
                tracing::warn!(
                    "Page reload timed out after {:?}, attempting new session...",
                    self.reload_timeout
                );
                self.hard_recover(session, factory).await
            }
        }
    }

    async fn hard_recover(
        &self,
        session: &mut Box<dyn TradingSession>,
        factory: &dyn SessionFactory,
    ) -> RecoveryOutcome {
        match factory.open().await {
            Ok(new_session) => {
                *session = new_session;
                tracing::info!(
                    "New session established, settling {:?} for manual re-login...",
                    self.settle_delay
                );
                tokio::time::sleep(self.settle_delay).await;
                RecoveryOutcome::HardRecovered
            }
            Err(e) => {
                let err = BotError::Recovery(e.to_string());
                tracing::error!("Hard recovery failed: {}", err);
                RecoveryOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MockSession, MockSessionFactory};

    fn manager(max: u32) -> RecoveryManager {
        RecoveryManager::new(max, Duration::from_millis(50), Duration::ZERO)
    }

    fn boxed_session() -> (Box<dyn TradingSession>, MockSession) {
        let mock = MockSession::new();
        (Box::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_counts_below_threshold_without_escalating() {
        let mut recovery = manager(5);
        let (mut session, mock) = boxed_session();
        let factory = MockSessionFactory::new();

        for expected in 1..5 {
            match recovery.record_failure(&mut session, &factory).await {
                RecoveryOutcome::Counted(n) => assert_eq!(n, expected),
                other => panic!("Expected Counted, got {:?}", other),
            }
        }
        assert_eq!(mock.state().lock().unwrap().reload_count, 0);
        assert_eq!(factory.state().lock().unwrap().open_count, 0);
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let mut recovery = manager(5);
        let (mut session, _mock) = boxed_session();
        let factory = MockSessionFactory::new();

        for _ in 0..3 {
            recovery.record_failure(&mut session, &factory).await;
        }
        assert_eq!(recovery.failures(), 3);
        recovery.record_success();
        assert_eq!(recovery.failures(), 0);
    }

    #[tokio::test]
    async fn test_threshold_triggers_exactly_one_soft_recovery() {
        let mut recovery = manager(5);
        let (mut session, mock) = boxed_session();
        let factory = MockSessionFactory::new();

        for _ in 0..4 {
            recovery.record_failure(&mut session, &factory).await;
        }
        let outcome = recovery.record_failure(&mut session, &factory).await;
        assert!(matches!(outcome, RecoveryOutcome::SoftRecovered));
        assert_eq!(mock.state().lock().unwrap().reload_count, 1);
        // 升级后计数立即归零
        assert_eq!(recovery.failures(), 0);
    }

    #[tokio::test]
    async fn test_reload_failure_escalates_to_hard_recovery() {
        let mut recovery = manager(1);
        let (mut session, mock) = boxed_session();
        mock.state().lock().unwrap().fail_reloads(1);
        let factory = MockSessionFactory::new();

        let outcome = recovery.record_failure(&mut session, &factory).await;
        assert!(matches!(outcome, RecoveryOutcome::HardRecovered));
        assert_eq!(factory.state().lock().unwrap().open_count, 1);
        // 旧会话只被重载过一次，之后被替换
        assert_eq!(mock.state().lock().unwrap().reload_count, 1);
    }

    #[tokio::test]
    async fn test_reload_timeout_escalates_to_hard_recovery() {
        let mut recovery = manager(1);
        let (mut session, mock) = boxed_session();
        mock.state().lock().unwrap().reload_hangs = true;
        let factory = MockSessionFactory::new();

        let outcome = recovery.record_failure(&mut session, &factory).await;
        assert!(matches!(outcome, RecoveryOutcome::HardRecovered));
        assert_eq!(factory.state().lock().unwrap().open_count, 1);
    }

    #[tokio::test]
    async fn test_hard_recovery_failure_keeps_old_session() {
        let mut recovery = manager(1);
        let (mut session, mock) = boxed_session();
        mock.state().lock().unwrap().fail_reloads(1);
        let factory = MockSessionFactory::new();
        factory.fail_opens(1);

        let outcome = recovery.record_failure(&mut session, &factory).await;
        assert!(matches!(outcome, RecoveryOutcome::Failed(BotError::Recovery(_))));
        assert_eq!(recovery.failures(), 0);

        // 原会话仍然可用：下一轮失败周期会重试
        session.capture().await.unwrap();
        assert_eq!(mock.state().lock().unwrap().capture_count, 1);
    }
}
