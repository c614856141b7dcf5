use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::infrastructure::{ChromeDriver, SessionHandle};

/// 创建一个新的浏览器会话
///
/// 设置了 `debug_port` 时连接已运行的浏览器，否则启动新的浏览器进程。
pub async fn launch_session(settings: &BrowserSettings) -> Result<SessionHandle> {
    let (browser, handler, owns_browser) = match settings.debug_port {
        Some(port) => {
            let (browser, handler) = connect_browser(port).await?;
            (browser, handler, false)
        }
        None => {
            let (browser, handler) = start_browser(settings).await?;
            (browser, handler, true)
        }
    };

    let handler_task = spawn_event_loop(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        anyhow!("创建页面失败: {}", e)
    })?;
    debug!("页面创建成功");

    let label = match settings.debug_port {
        Some(port) => format!("localhost:{}", port),
        None if settings.headless => "headless".to_string(),
        None => "headed".to_string(),
    };
    let driver = ChromeDriver::new(browser, page, handler_task, owns_browser);
    Ok(SessionHandle::new(Arc::new(driver), label))
}

/// 连接到已运行的浏览器
async fn connect_browser(port: u16) -> Result<(Browser, Handler)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        anyhow!("无法连接到浏览器 (端口: {}): {}", port, e)
    })?;
    debug!("浏览器连接成功");
    Ok((browser, handler))
}

/// 启动新的浏览器进程
async fn start_browser(settings: &BrowserSettings) -> Result<(Browser, Handler)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if settings.headless { "无头模式" } else { "可见模式" }
    );

    let mut builder = BrowserConfig::builder()
        .window_size(settings.window_width, settings.window_height)
        .args(vec!["--disable-dev-shm-usage", "--no-first-run"]);

    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(executable) = &settings.executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");
    Ok((browser, handler))
}

/// 在后台处理浏览器事件
fn spawn_event_loop(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("浏览器事件错误: {}", e);
            }
        }
    })
}
