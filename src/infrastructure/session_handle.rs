use std::sync::Arc;

use tracing::{info, warn};

use crate::error::DriverResult;
use crate::infrastructure::ui_driver::UiDriver;

/// 独占的自动化浏览器会话
///
/// 一次运行只持有一个；`teardown` 消耗自身，保证只关闭一次。
pub struct SessionHandle {
    driver: Arc<dyn UiDriver>,
    label: String,
}

impl SessionHandle {
    pub fn new(driver: Arc<dyn UiDriver>, label: impl Into<String>) -> Self {
        Self {
            driver,
            label: label.into(),
        }
    }

    pub fn driver(&self) -> Arc<dyn UiDriver> {
        Arc::clone(&self.driver)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 关闭会话
    pub async fn teardown(self) -> DriverResult<()> {
        info!("🧹 正在关闭浏览器会话 ({})", self.label);
        let result = self.driver.shutdown().await;
        if let Err(e) = &result {
            warn!("⚠️ 关闭会话 {} 时出错: {}", self.label, e);
        }
        result
    }
}
