//! Mock 会话（用于测试，无需浏览器）
//!
//! 通过脚本化的结果队列模拟截图 / 重载 / 点击的成败，并记录调用次数供断言。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::session::{Control, ControlTag, SessionError, SessionFactory, TradingSession};

/// Mock 会话的脚本与调用记录
///
/// 各 `*_plan` 队列为空时按成功处理，非空时依次弹出预设结果。
#[derive(Debug)]
pub struct MockSessionState {
    pub capture_plan: VecDeque<Result<Vec<u8>, String>>,
    pub reload_plan: VecDeque<Result<(), String>>,
    pub activate_plan: VecDeque<Result<(), String>>,
    /// 页面上是否存在 BUY/SELL 控件
    pub control_present: bool,
    /// 重载永不返回（测试有界超时用）
    pub reload_hangs: bool,
    pub capture_count: usize,
    pub reload_count: usize,
    pub locate_count: usize,
    /// 已点击的控件（按定位时的 tag 记录）
    pub activations: Vec<String>,
}

impl Default for MockSessionState {
    fn default() -> Self {
        Self {
            capture_plan: VecDeque::new(),
            reload_plan: VecDeque::new(),
            activate_plan: VecDeque::new(),
            control_present: true,
            reload_hangs: false,
            capture_count: 0,
            reload_count: 0,
            locate_count: 0,
            activations: Vec::new(),
        }
    }
}

impl MockSessionState {
    /// 预设接下来 n 次截图失败
    pub fn fail_captures(&mut self, n: usize) {
        for _ in 0..n {
            self.capture_plan.push_back(Err("simulated capture failure".to_string()));
        }
    }

    /// 预设接下来 n 次重载失败
    pub fn fail_reloads(&mut self, n: usize) {
        for _ in 0..n {
            self.reload_plan.push_back(Err("simulated reload failure".to_string()));
        }
    }
}

/// Mock 交易会话：行为由共享的 MockSessionState 驱动
#[derive(Clone)]
pub struct MockSession {
    state: Arc<Mutex<MockSessionState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::from_state(MockSessionState::default())
    }

    pub fn from_state(state: MockSessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// 共享状态句柄：会话交给调度器后测试仍可检查/改写脚本
    pub fn state(&self) -> Arc<Mutex<MockSessionState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradingSession for MockSession {
    async fn capture(&self) -> Result<Vec<u8>, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.capture_count += 1;
        match state.capture_plan.pop_front() {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(msg)) => Err(SessionError::Capture(msg)),
            None => Ok(vec![0xFF, 0xD8, 0xFF, 0xD9]),
        }
    }

    async fn locate_control(&self, tag: ControlTag) -> Result<Option<Control>, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.locate_count += 1;
        if state.control_present {
            Ok(Some(Control {
                selector: tag.to_string(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn activate(&self, control: &Control) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        match state.activate_plan.pop_front() {
            Some(Err(msg)) => Err(SessionError::Interaction(msg)),
            _ => {
                state.activations.push(control.selector.clone());
                Ok(())
            }
        }
    }

    async fn reload(&self) -> Result<(), SessionError> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.reload_count += 1;
            state.reload_hangs
        };
        if hang {
            std::future::pending::<()>().await;
        }
        match self.state.lock().unwrap().reload_plan.pop_front() {
            Some(Err(msg)) => Err(SessionError::Reload(msg)),
            _ => Ok(()),
        }
    }
}

/// Mock 工厂的脚本与记录
#[derive(Debug, Default)]
pub struct MockFactoryState {
    /// open 的预设结果；为空时按成功处理
    pub open_plan: VecDeque<Result<(), String>>,
    /// 新开会话使用的脚本；为空时用默认脚本
    pub session_scripts: VecDeque<MockSessionState>,
    pub open_count: usize,
    /// 每个已打开会话的状态句柄（按打开顺序）
    pub opened: Vec<Arc<Mutex<MockSessionState>>>,
}

/// Mock 会话工厂：记录 open 次数并保留各会话的状态句柄
#[derive(Clone, Default)]
pub struct MockSessionFactory {
    state: Arc<Mutex<MockFactoryState>>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<MockFactoryState>> {
        Arc::clone(&self.state)
    }

    /// 为下一个打开的会话预设脚本
    pub fn push_session_script(&self, script: MockSessionState) {
        self.state.lock().unwrap().session_scripts.push_back(script);
    }

    /// 预设接下来 n 次 open 失败
    pub fn fail_opens(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..n {
            state.open_plan.push_back(Err("simulated open failure".to_string()));
        }
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self) -> Result<Box<dyn TradingSession>, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.open_count += 1;
        if let Some(Err(msg)) = state.open_plan.pop_front() {
            return Err(SessionError::Launch(msg));
        }
        let script = state.session_scripts.pop_front().unwrap_or_default();
        let session = MockSession::from_state(script);
        state.opened.push(session.state());
        Ok(Box::new(session))
    }
}
