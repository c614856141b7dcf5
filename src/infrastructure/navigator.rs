//! 导航原语
//!
//! 上层组件接触外部页面的唯一方式。每个操作都是有时限的等待，
//! 不存在“发出即不管”的交互。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::Config;
use crate::error::{NavError, NavResult};
use crate::infrastructure::retry::{retry_on_staleness, StaleRetryPolicy};
use crate::infrastructure::ui_driver::{Anchor, AnchorState, UiDriver};

/// 导航器
#[derive(Clone)]
pub struct Navigator {
    driver: Arc<dyn UiDriver>,
    poll_interval: Duration,
    stale_policy: StaleRetryPolicy,
}

impl Navigator {
    pub fn new(
        driver: Arc<dyn UiDriver>,
        poll_interval: Duration,
        stale_policy: StaleRetryPolicy,
    ) -> Self {
        Self {
            driver,
            poll_interval,
            stale_policy,
        }
    }

    pub fn from_config(driver: Arc<dyn UiDriver>, config: &Config) -> Self {
        Self::new(
            driver,
            Duration::from_millis(config.retry.poll_interval_ms),
            StaleRetryPolicy::from(&config.retry),
        )
    }

    /// 轮询直到锚点达到 `ready` 状态；超时返回 `None`
    async fn poll_until(
        &self,
        anchor: &Anchor,
        timeout: Duration,
        ready: fn(AnchorState) -> bool,
    ) -> NavResult<Option<AnchorState>> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self
                .driver
                .probe(anchor)
                .await
                .map_err(|e| NavError::from_driver(&anchor.name, e))?;
            if ready(state) {
                return Ok(Some(state));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn require(
        &self,
        anchor: &Anchor,
        timeout: Duration,
        ready: fn(AnchorState) -> bool,
    ) -> NavResult<()> {
        match self.poll_until(anchor, timeout, ready).await? {
            Some(_) => Ok(()),
            None => Err(NavError::AnchorTimeout {
                anchor: anchor.name.clone(),
                timeout,
            }),
        }
    }

    /// 等待锚点可交互后点击
    pub async fn wait_and_click(&self, anchor: &Anchor, timeout: Duration) -> NavResult<()> {
        self.require(anchor, timeout, |s| s == AnchorState::Interactable)
            .await?;
        debug!("点击 {}", anchor);
        self.driver
            .click(anchor)
            .await
            .map_err(|e| NavError::from_driver(&anchor.name, e))
    }

    /// 等待锚点存在后追加输入文本
    pub async fn wait_and_type(
        &self,
        anchor: &Anchor,
        text: &str,
        timeout: Duration,
    ) -> NavResult<()> {
        self.require(anchor, timeout, AnchorState::is_present).await?;
        debug!("输入 {} ({} 个字符)", anchor, text.chars().count());
        self.driver
            .type_text(anchor, text)
            .await
            .map_err(|e| NavError::from_driver(&anchor.name, e))
    }

    /// 点击，元素过期时按策略重试
    pub async fn wait_and_click_retrying(
        &self,
        anchor: &Anchor,
        timeout: Duration,
    ) -> NavResult<()> {
        retry_on_staleness(self.stale_policy, &anchor.name, || {
            self.wait_and_click(anchor, timeout)
        })
        .await
    }

    /// 等待锚点存在
    pub async fn wait_for(&self, anchor: &Anchor, timeout: Duration) -> NavResult<()> {
        self.require(anchor, timeout, AnchorState::is_present).await
    }

    /// 锚点是否在时限内出现；未出现不算错误
    pub async fn appears_within(&self, anchor: &Anchor, timeout: Duration) -> NavResult<bool> {
        Ok(self
            .poll_until(anchor, timeout, AnchorState::is_present)
            .await?
            .is_some())
    }

    /// 可选弹窗：时限内可点击则点击，返回是否点击
    pub async fn click_if_present(&self, anchor: &Anchor, timeout: Duration) -> NavResult<bool> {
        match self
            .poll_until(anchor, timeout, |s| s == AnchorState::Interactable)
            .await?
        {
            Some(_) => {
                self.driver
                    .click(anchor)
                    .await
                    .map_err(|e| NavError::from_driver(&anchor.name, e))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 等待上传控件存在后设置文件
    pub async fn wait_and_attach(
        &self,
        anchor: &Anchor,
        path: &Path,
        timeout: Duration,
    ) -> NavResult<()> {
        self.require(anchor, timeout, AnchorState::is_present).await?;
        debug!("上传文件 {} -> {}", path.display(), anchor);
        self.driver
            .attach_file(anchor, path)
            .await
            .map_err(|e| NavError::from_driver(&anchor.name, e))
    }

    /// 等待锚点的 `value` 非空并返回
    pub async fn wait_for_value(&self, anchor: &Anchor, timeout: Duration) -> NavResult<String> {
        let deadline = Instant::now() + timeout;
        loop {
            if self
                .poll_until(anchor, deadline.saturating_duration_since(Instant::now()), AnchorState::is_present)
                .await?
                .is_some()
            {
                let value = self
                    .driver
                    .read_value(anchor)
                    .await
                    .map_err(|e| NavError::from_driver(&anchor.name, e))?;
                if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                    return Ok(value);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(NavError::AnchorTimeout {
                    anchor: anchor.name.clone(),
                    timeout,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    pub async fn read_text(&self, anchor: &Anchor) -> NavResult<Option<String>> {
        self.driver
            .read_text(anchor)
            .await
            .map_err(|e| NavError::from_driver(&anchor.name, e))
    }

    pub async fn navigate(&self, url: &str) -> NavResult<()> {
        debug!("导航到 {}", url);
        self.driver
            .navigate(url)
            .await
            .map_err(|e| NavError::from_driver(url, e))
    }

    pub async fn reload(&self) -> NavResult<()> {
        self.driver
            .reload()
            .await
            .map_err(|e| NavError::from_driver("page.reload", e))
    }
}
