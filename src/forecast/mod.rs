//! 预测层：预测服务抽象与实现（OpenAI 兼容 / Mock）

pub mod client;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod traits;
pub mod types;

pub use client::{parse_forecast, ForecastClient};
pub use mock::MockForecastBackend;
pub use openai::{OpenAiForecastBackend, TokenUsage};
pub use prompt::{response_schema, ANALYST_PROMPT};
pub use traits::{ForecastBackend, ForecastError, RawForecast};
pub use types::{Prediction, TradeDirection};
