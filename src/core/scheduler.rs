//! 主控循环：Capture -> Analyze -> Gate -> Plan
//!
//! 单任务顺序执行，迭代之间无并行；任何迭代级故障都在迭代边界被捕获并交给
//! 恢复管理器，绝不让稳态循环崩溃。启动期（首次开会话 + 登录等待）的故障是
//! 致命的。取消令牌在每轮开始前与两处固定等待（登录等待、轮间延迟）中检查。

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::core::{
    ActionPlanner, BotError, ConfidenceGate, GateDecision, RecoveryManager, RejectReason,
};
use crate::forecast::{
    ForecastBackend, ForecastClient, MockForecastBackend, OpenAiForecastBackend,
};
use crate::session::{ChromeSessionFactory, ControlSelectors, SessionFactory, TradingSession};
use crate::store::{ActionLog, PlannedAction, SnapshotStore};

/// Gemini 的 OpenAI 兼容端点
const GEMINI_COMPAT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// 一轮迭代的正常结局（闸门拒绝也算正常）
#[derive(Debug)]
pub enum IterationOutcome {
    /// 决策已落盘（UI 反映尽力而为）
    Planned(PlannedAction),
    /// 被闸门拒绝，跳过本轮
    Skipped(RejectReason),
}

/// 固定节奏：轮间延迟与启动时的登录等待
#[derive(Debug, Clone, Copy)]
pub struct SchedulerTiming {
    pub iteration_delay: Duration,
    pub login_wait: Duration,
}

/// 主控循环调度器：独占会话句柄与恢复状态
pub struct LoopScheduler {
    factory: Box<dyn SessionFactory>,
    store: SnapshotStore,
    forecast: ForecastClient,
    gate: ConfidenceGate,
    planner: ActionPlanner,
    recovery: RecoveryManager,
    timing: SchedulerTiming,
    cancel_token: CancellationToken,
}

impl LoopScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        factory: Box<dyn SessionFactory>,
        store: SnapshotStore,
        forecast: ForecastClient,
        gate: ConfidenceGate,
        planner: ActionPlanner,
        recovery: RecoveryManager,
        timing: SchedulerTiming,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            factory,
            store,
            forecast,
            gate,
            planner,
            recovery,
            timing,
            cancel_token,
        }
    }

    /// 运行直到取消：一次性启动，然后进入无限分析循环
    ///
    /// 返回 Err 仅发生在启动期；稳态故障全部在循环内消化。
    pub async fn run(&mut self) -> Result<(), BotError> {
        let mut session = self
            .factory
            .open()
            .await
            .map_err(|e| BotError::Startup(e.to_string()))?;

        tracing::info!(
            "Waiting {:?} for manual login...",
            self.timing.login_wait
        );
        if self.wait_or_cancelled(self.timing.login_wait).await {
            return Ok(());
        }

        tracing::info!("Entering continuous analysis loop");
        loop {
            if self.cancel_token.is_cancelled() {
                tracing::info!("Shutdown requested, leaving analysis loop");
                return Ok(());
            }

            match self.run_iteration(session.as_ref()).await {
                Ok(IterationOutcome::Planned(action)) => {
                    tracing::info!(
                        direction = %action.direction,
                        confidence = action.confidence,
                        "Iteration complete: action planned"
                    );
                    self.recovery.record_success();
                }
                Ok(IterationOutcome::Skipped(reason)) => {
                    // 拒绝是常态：与成功一样清零计数
                    tracing::info!("Skipped ({})", reason);
                    self.recovery.record_success();
                }
                Err(e) => {
                    tracing::warn!("Loop error #{}: {}", self.recovery.failures() + 1, e);
                    let outcome = self
                        .recovery
                        .record_failure(&mut session, self.factory.as_ref())
                        .await;
                    tracing::debug!(?outcome, "Recovery handling finished");
                }
            }

            if self.wait_or_cancelled(self.timing.iteration_delay).await {
                tracing::info!("Shutdown requested during delay, leaving analysis loop");
                return Ok(());
            }
        }
    }

    /// 单轮迭代：截图 -> 分析 -> 闸门 ->（通过则）规划
    async fn run_iteration(
        &self,
        session: &dyn TradingSession,
    ) -> Result<IterationOutcome, BotError> {
        let snapshot = self
            .store
            .capture(session)
            .await
            .map_err(|e| BotError::Capture(e.to_string()))?;
        tracing::info!(path = %snapshot.path.display(), "Snapshot captured");

        let prediction = self
            .forecast
            .analyze(&snapshot)
            .await
            .map_err(|e| BotError::ForecastService(e.to_string()))?;
        tracing::info!(
            direction = %prediction.direction,
            confidence = prediction.confidence,
            current_value = prediction.current_value,
            forecast = prediction.forecast,
            "AI analysis"
        );

        match self.gate.evaluate(prediction) {
            GateDecision::Accept {
                prediction,
                direction,
            } => {
                let action = self.planner.plan(session, &prediction, direction).await?;
                Ok(IterationOutcome::Planned(action))
            }
            GateDecision::Reject(reason) => Ok(IterationOutcome::Skipped(reason)),
        }
    }

    /// 等待固定时长；收到取消信号时提前返回 true
    async fn wait_or_cancelled(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel_token.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}

/// 根据配置与环境变量选择预测后端（Gemini 兼容 / OpenAI / Mock）
pub(crate) fn create_forecast_backend(cfg: &AppConfig) -> Arc<dyn ForecastBackend> {
    let provider = cfg.forecast.provider.to_lowercase();
    let gemini_key = std::env::var("GEMINI_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();

    if provider == "gemini" && gemini_key.is_some() {
        let base = cfg
            .forecast
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_COMPAT_BASE_URL.to_string());
        tracing::info!("Using Gemini forecast backend ({})", cfg.forecast.model);
        if let Some(key) = gemini_key {
            return Arc::new(OpenAiForecastBackend::new(
                Some(&base),
                &cfg.forecast.model,
                &key,
            ));
        }
    }
    if let Some(key) = openai_key {
        tracing::info!("Using OpenAI forecast backend ({})", cfg.forecast.model);
        return Arc::new(OpenAiForecastBackend::new(
            cfg.forecast.base_url.as_deref(),
            &cfg.forecast.model,
            &key,
        ));
    }
    tracing::warn!("No API key set, using Mock forecast backend");
    Arc::new(MockForecastBackend::new())
}

/// 按配置组装整条流水线
pub fn create_scheduler(cfg: &AppConfig, cancel_token: CancellationToken) -> LoopScheduler {
    let factory = ChromeSessionFactory::new(
        cfg.app.target_url.clone(),
        ControlSelectors {
            buy: cfg.session.buy_selector.clone(),
            sell: cfg.session.sell_selector.clone(),
        },
        cfg.session.headless,
        Duration::from_secs(cfg.session.nav_timeout_secs),
    );

    let backend = create_forecast_backend(cfg);

    LoopScheduler::new(
        Box::new(factory),
        SnapshotStore::new(cfg.app.screens_dir.clone()),
        ForecastClient::new(backend),
        ConfidenceGate::new(cfg.gate.confidence_threshold),
        ActionPlanner::new(ActionLog::new(cfg.app.actions_log.clone())),
        RecoveryManager::new(
            cfg.recovery.max_consecutive_errors,
            Duration::from_secs(cfg.recovery.reload_timeout_secs),
            Duration::from_secs(cfg.recovery.settle_secs),
        ),
        SchedulerTiming {
            iteration_delay: Duration::from_secs(cfg.scheduler.iteration_delay_secs),
            login_wait: Duration::from_secs(cfg.scheduler.login_wait_secs),
        },
        cancel_token,
    )
}
