use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "quiz_publisher.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器设置
    pub browser: BrowserSettings,
    /// 各类等待时限
    pub timeouts: Timeouts,
    /// 过期重试与轮询
    pub retry: RetrySettings,
    /// 图片搜索设置
    pub image_search: ImageSearchSettings,
    /// 登录页地址
    pub login_url: String,
    /// 测验文件或目录
    pub quiz_path: String,
    /// 发布结果日志文件
    pub output_log_file: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// 无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径，留空则自动查找
    pub executable: Option<String>,
    /// 连接已运行浏览器的调试端口，设置后不再启动新浏览器
    pub debug_port: Option<u16>,
    pub window_width: u32,
    pub window_height: u32,
}

/// 等待时限（毫秒）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// 普通锚点
    pub default_ms: u64,
    /// Cookie 同意弹窗
    pub consent_ms: u64,
    /// 登录错误提示
    pub auth_error_ms: u64,
    /// 订阅推广弹窗
    pub promo_frame_ms: u64,
    /// 图片上传完成
    pub upload_ms: u64,
    /// 新题模板选择器
    pub template_chooser_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// 过期后最多重新执行的次数
    pub stale_retries: u32,
    /// 两次重试之间的停顿（毫秒）
    pub stale_pause_ms: u64,
    /// 锚点就绪探测间隔（毫秒）
    pub poll_interval_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ImageSearchSettings {
    pub api_base_url: String,
    pub api_key: String,
    pub engine: String,
    /// 下载单张图片的超时（毫秒）
    pub fetch_timeout_ms: u64,
    /// 临时图片目录，留空使用系统临时目录
    pub temp_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserSettings::default(),
            timeouts: Timeouts::default(),
            retry: RetrySettings::default(),
            image_search: ImageSearchSettings::default(),
            login_url: "https://create.kahoot.it/auth/login".to_string(),
            quiz_path: "quizzes".to_string(),
            output_log_file: "publish_results.txt".to_string(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            executable: None,
            debug_port: None,
            window_width: 1600,
            window_height: 1000,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_ms: 15_000,
            consent_ms: 5_000,
            auth_error_ms: 4_000,
            promo_frame_ms: 20_000,
            upload_ms: 50_000,
            template_chooser_ms: 15_000,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            stale_retries: 2,
            stale_pause_ms: 500,
            poll_interval_ms: 250,
        }
    }
}

impl Default for ImageSearchSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://serpapi.com".to_string(),
            api_key: String::new(),
            engine: "google_images".to_string(),
            fetch_timeout_ms: 20_000,
            temp_dir: None,
        }
    }
}

impl Timeouts {
    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn consent(&self) -> Duration {
        Duration::from_millis(self.consent_ms)
    }

    pub fn auth_error(&self) -> Duration {
        Duration::from_millis(self.auth_error_ms)
    }

    pub fn promo_frame(&self) -> Duration {
        Duration::from_millis(self.promo_frame_ms)
    }

    pub fn upload(&self) -> Duration {
        Duration::from_millis(self.upload_ms)
    }

    pub fn template_chooser(&self) -> Duration {
        Duration::from_millis(self.template_chooser_ms)
    }
}

impl ImageSearchSettings {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（如存在）→ 环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var("QUIZ_PUBLISHER_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(Path::new(&path))?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        let d = self;
        Self {
            browser: BrowserSettings {
                headless: env_parse("BROWSER_HEADLESS").unwrap_or(d.browser.headless),
                executable: std::env::var("BROWSER_EXECUTABLE").ok().or(d.browser.executable),
                debug_port: env_parse("BROWSER_DEBUG_PORT").or(d.browser.debug_port),
                ..d.browser
            },
            timeouts: Timeouts {
                default_ms: env_parse("DEFAULT_TIMEOUT_MS").unwrap_or(d.timeouts.default_ms),
                upload_ms: env_parse("UPLOAD_TIMEOUT_MS").unwrap_or(d.timeouts.upload_ms),
                ..d.timeouts
            },
            retry: RetrySettings {
                stale_retries: env_parse("STALE_RETRIES").unwrap_or(d.retry.stale_retries),
                ..d.retry
            },
            image_search: ImageSearchSettings {
                api_key: std::env::var("SERPAPI_API_KEY").unwrap_or(d.image_search.api_key),
                api_base_url: std::env::var("SERPAPI_BASE_URL")
                    .unwrap_or(d.image_search.api_base_url),
                ..d.image_search
            },
            login_url: std::env::var("LOGIN_URL").unwrap_or(d.login_url),
            quiz_path: std::env::var("QUIZ_PATH").unwrap_or(d.quiz_path),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(d.output_log_file),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
