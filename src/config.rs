//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `OWL__*` 覆盖（双下划线表示嵌套，
//! 如 `OWL__GATE__CONFIDENCE_THRESHOLD=0.85`）。API Key 只从环境变量读取
//! （GEMINI_API_KEY / OPENAI_API_KEY），不进配置文件。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub forecast: ForecastSection,
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub recovery: RecoverySection,
}

/// [app] 段：目标站点与落盘路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// 盯盘目标页面
    pub target_url: String,
    /// 快照目录
    pub screens_dir: PathBuf,
    /// 决策日志（JSONL，追加写）
    pub actions_log: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            target_url: "https://pocketoption.com/en".to_string(),
            screens_dir: PathBuf::from("screens"),
            actions_log: PathBuf::from("planned_actions.jsonl"),
        }
    }
}

/// [session] 段：浏览器会话参数与控件选择器
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// 手动登录需要可见窗口，默认非 headless
    pub headless: bool,
    /// BUY 控件选择器（站点 UI 改版时在此更新）
    pub buy_selector: String,
    /// SELL 控件选择器
    pub sell_selector: String,
    /// 导航/元素等待超时（秒）
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,
}

fn default_nav_timeout_secs() -> u64 {
    60
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            headless: false,
            buy_selector: "#put-call-buttons-chart-1 > div > div.buttons__wrap > div.tour-action-buttons-container > div.action-high-low.button-call-wrap".to_string(),
            sell_selector: "#put-call-buttons-chart-1 > div > div.buttons__wrap > div.tour-action-buttons-container > div.action-high-low.button-put-wrap".to_string(),
            nav_timeout_secs: default_nav_timeout_secs(),
        }
    }
}

/// [forecast] 段：预测服务选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    /// 后端：gemini / openai；没有任何 Key 时退回 Mock
    pub provider: String,
    pub model: String,
    /// 自定义 OpenAI 兼容端点；gemini 下不填则用官方兼容层
    pub base_url: Option<String>,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
        }
    }
}

/// [gate] 段：置信度闸门
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateSection {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_confidence_threshold() -> f64 {
    0.8
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

/// [scheduler] 段：主循环节奏
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// 轮间延迟（秒）
    #[serde(default = "default_iteration_delay_secs")]
    pub iteration_delay_secs: u64,
    /// 启动后等待手动登录的时间（秒）
    #[serde(default = "default_login_wait_secs")]
    pub login_wait_secs: u64,
}

fn default_iteration_delay_secs() -> u64 {
    10
}

fn default_login_wait_secs() -> u64 {
    25
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            iteration_delay_secs: default_iteration_delay_secs(),
            login_wait_secs: default_login_wait_secs(),
        }
    }
}

/// [recovery] 段：连续失败阈值与恢复节奏
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    /// 连续失败达到此数触发恢复
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
    /// 软恢复（页面重载）的有界超时（秒）
    #[serde(default = "default_reload_timeout_secs")]
    pub reload_timeout_secs: u64,
    /// 硬恢复后等待人工重新登录的时间（秒）
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

fn default_max_consecutive_errors() -> u32 {
    5
}

fn default_reload_timeout_secs() -> u64 {
    60
}

fn default_settle_secs() -> u64 {
    25
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            max_consecutive_errors: default_max_consecutive_errors(),
            reload_timeout_secs: default_reload_timeout_secs(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            session: SessionSection::default(),
            forecast: ForecastSection::default(),
            gate: GateSection::default(),
            scheduler: SchedulerSection::default(),
            recovery: RecoverySection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 OWL__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 OWL__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("OWL")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
