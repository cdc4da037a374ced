//! 行动规划器：持久记录已接受的决策，并尽力在页面上反映它
//!
//! 顺序约定：先把 PlannedAction 追加进决策日志（失败会上抛，是迭代级故障），
//! 之后才尝试定位并点击对应方向控件；UI 这步的任何失败只记 warn 并吞掉，
//! 既不推翻已落盘的决策，也不计入失败计数。

use chrono::Utc;

use crate::core::BotError;
use crate::forecast::{Prediction, TradeDirection};
use crate::session::{ControlTag, SessionError, TradingSession};
use crate::store::{ActionLog, PlannedAction};

/// 行动规划器：决策日志 + 尽力而为的控件点击
pub struct ActionPlanner {
    log: ActionLog,
}

impl ActionPlanner {
    pub fn new(log: ActionLog) -> Self {
        Self { log }
    }

    /// 处理一条已通过闸门的预测
    pub async fn plan(
        &self,
        session: &dyn TradingSession,
        prediction: &Prediction,
        direction: TradeDirection,
    ) -> Result<PlannedAction, BotError> {
        let action = PlannedAction::from_prediction(prediction, Utc::now());
        self.log
            .append(&action)
            .map_err(|e| BotError::Journal(e.to_string()))?;
        tracing::info!(
            direction = %action.direction,
            confidence = action.confidence,
            "PlannedAction recorded"
        );

        if let Err(e) = self.press_control(session, direction).await {
            tracing::warn!("Control interaction failed (ignored): {}", e);
        }

        Ok(action)
    }

    async fn press_control(
        &self,
        session: &dyn TradingSession,
        direction: TradeDirection,
    ) -> Result<(), SessionError> {
        let tag = match direction {
            TradeDirection::Buy => ControlTag::Buy,
            TradeDirection::Sell => ControlTag::Sell,
        };
        match session.locate_control(tag).await? {
            Some(control) => session.activate(&control).await,
            None => {
                tracing::warn!(%tag, "Direction control not present, skipping activation");
                Ok(())
            }
        }
    }
}
