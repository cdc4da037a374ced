//! 交易会话抽象
//!
//! 所有会话实现（Chrome / Mock）实现 TradingSession：截图、控件定位与点击、页面重载。
//! SessionFactory 负责打开一个已导航到目标站点的新会话（启动与硬恢复共用）。

use async_trait::async_trait;
use thiserror::Error;

/// 会话层错误（浏览器启动、导航、截图、控件交互、重载）
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigate(String),

    #[error("Screenshot failed: {0}")]
    Capture(String),

    #[error("Control interaction failed: {0}")]
    Interaction(String),

    #[error("Page reload failed: {0}")]
    Reload(String),
}

/// 页面上可点击的方向控件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTag {
    Buy,
    Sell,
}

impl std::fmt::Display for ControlTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlTag::Buy => write!(f, "BUY"),
            ControlTag::Sell => write!(f, "SELL"),
        }
    }
}

/// 已定位控件的不透明句柄：activate 时凭它重新查找并点击
#[derive(Debug, Clone)]
pub struct Control {
    pub selector: String,
}

/// 交易会话 trait：盯盘循环读取它，恢复流程替换它
#[async_trait]
pub trait TradingSession: Send + Sync {
    /// 对整页截图，返回 JPEG 字节
    async fn capture(&self) -> Result<Vec<u8>, SessionError>;

    /// 定位方向控件；页面上不存在时返回 None（不视为错误）
    async fn locate_control(&self, tag: ControlTag) -> Result<Option<Control>, SessionError>;

    /// 点击已定位的控件
    async fn activate(&self, control: &Control) -> Result<(), SessionError>;

    /// 原地重载当前页面（软恢复）
    async fn reload(&self) -> Result<(), SessionError>;
}

/// 会话工厂：打开一个新会话并导航到目标站点（启动与硬恢复共用）
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn TradingSession>, SessionError>;
}
