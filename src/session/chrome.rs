//! Chrome 会话实现：使用 Headless Chrome 驱动真实页面
//!
//! 需系统已安装 Chrome/Chromium。headless_chrome 为同步 API，
//! 所有 CDP 调用包在 spawn_blocking 中执行。手动登录场景下 headless 应设为 false。

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::session::{Control, ControlTag, SessionError, SessionFactory, TradingSession};

/// JPEG 截图质量（0-100）
const SCREENSHOT_QUALITY: u32 = 85;

/// 页面上 BUY/SELL 控件的 CSS 选择器
#[derive(Debug, Clone)]
pub struct ControlSelectors {
    pub buy: String,
    pub sell: String,
}

impl ControlSelectors {
    fn for_tag(&self, tag: ControlTag) -> &str {
        match tag {
            ControlTag::Buy => &self.buy,
            ControlTag::Sell => &self.sell,
        }
    }
}

/// 基于 Headless Chrome 的交易会话：持有单个 Tab
pub struct ChromeSession {
    tab: Arc<Tab>,
    selectors: ControlSelectors,
}

#[async_trait]
impl TradingSession for ChromeSession {
    async fn capture(&self) -> Result<Vec<u8>, SessionError> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            tab.capture_screenshot(
                Page::CaptureScreenshotFormatOption::Jpeg,
                Some(SCREENSHOT_QUALITY),
                None,
                true,
            )
            .map_err(|e| SessionError::Capture(e.to_string()))
        })
        .await
        .map_err(|e| SessionError::Capture(format!("Task join: {}", e)))?
    }

    async fn locate_control(&self, tag: ControlTag) -> Result<Option<Control>, SessionError> {
        let tab = Arc::clone(&self.tab);
        let selector = self.selectors.for_tag(tag).to_string();
        tokio::task::spawn_blocking(move || {
            // 站点 UI 随版本变化，找不到控件按「不存在」处理而不是报错
            match tab.find_element(&selector) {
                Ok(_) => Ok(Some(Control { selector })),
                Err(_) => Ok(None),
            }
        })
        .await
        .map_err(|e| SessionError::Interaction(format!("Task join: {}", e)))?
    }

    async fn activate(&self, control: &Control) -> Result<(), SessionError> {
        let tab = Arc::clone(&self.tab);
        let selector = control.selector.clone();
        tokio::task::spawn_blocking(move || {
            let element = tab
                .find_element(&selector)
                .map_err(|e| SessionError::Interaction(format!("Find failed: {}", e)))?;
            element
                .click()
                .map_err(|e| SessionError::Interaction(format!("Click failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| SessionError::Interaction(format!("Task join: {}", e)))?
    }

    async fn reload(&self) -> Result<(), SessionError> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            tab.reload(false, None)
                .map_err(|e| SessionError::Reload(format!("Reload failed: {}", e)))?;
            tab.wait_for_element("body")
                .map_err(|e| SessionError::Reload(format!("Page load failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| SessionError::Reload(format!("Task join: {}", e)))?
    }
}

/// Chrome 会话工厂：首次 open 时启动浏览器，之后复用同一实例开新 Tab
///
/// 硬恢复走同一条路径：丢弃旧 Tab，在已运行的浏览器里新开一个并重新导航。
pub struct ChromeSessionFactory {
    target_url: String,
    selectors: ControlSelectors,
    headless: bool,
    nav_timeout: Duration,
    browser: Arc<RwLock<Option<Browser>>>,
}

impl ChromeSessionFactory {
    pub fn new(
        target_url: impl Into<String>,
        selectors: ControlSelectors,
        headless: bool,
        nav_timeout: Duration,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            selectors,
            headless,
            nav_timeout,
            browser: Arc::new(RwLock::new(None)),
        }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self) -> Result<Box<dyn TradingSession>, SessionError> {
        let url = self.target_url.clone();
        let headless = self.headless;
        let nav_timeout = self.nav_timeout;
        let browser_arc = Arc::clone(&self.browser);

        tracing::info!(url = %url, "Opening trading session");

        let tab = tokio::task::spawn_blocking(move || {
            let mut browser_guard = browser_arc.write().map_err(|e| SessionError::Launch(e.to_string()))?;
            if browser_guard.is_none() {
                let options = LaunchOptions::default_builder()
                    .headless(headless)
                    .sandbox(false)
                    .build()
                    .map_err(|e| SessionError::Launch(e.to_string()))?;
                let browser = Browser::new(options)
                    .map_err(|e| SessionError::Launch(format!("Chrome launch failed: {}", e)))?;
                *browser_guard = Some(browser);
            }
            let browser = browser_guard
                .as_ref()
                .ok_or_else(|| SessionError::Launch("Browser unavailable".to_string()))?;

            let tab = browser
                .new_tab()
                .map_err(|e| SessionError::Launch(format!("Browser tab failed: {}", e)))?;
            tab.set_default_timeout(nav_timeout);
            tab.navigate_to(&url)
                .map_err(|e| SessionError::Navigate(format!("Navigate failed: {}", e)))?;
            tab.wait_for_element("body")
                .map_err(|e| SessionError::Navigate(format!("Page load failed: {}", e)))?;
            Ok::<_, SessionError>(tab)
        })
        .await
        .map_err(|e| SessionError::Launch(format!("Task join: {}", e)))??;

        Ok(Box::new(ChromeSession {
            tab,
            selectors: self.selectors.clone(),
        }))
    }
}
