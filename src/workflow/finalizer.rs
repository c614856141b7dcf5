//! 发布收尾
//!
//! 保存 → 打开分享 → 读取分享链接 → 关闭分享弹窗 → 完成。
//! 会话的释放也在这里，无论发布成功与否都必须执行一次。

use tracing::info;

use crate::config::Timeouts;
use crate::error::{NavError, PublishError};
use crate::infrastructure::{anchors, Navigator, SessionHandle};

pub struct PublicationFinalizer {
    navigator: Navigator,
    timeouts: Timeouts,
}

impl PublicationFinalizer {
    pub fn new(navigator: Navigator, timeouts: Timeouts) -> Self {
        Self {
            navigator,
            timeouts,
        }
    }

    /// 保存测验并返回分享链接
    pub async fn finalize(&self) -> Result<String, PublishError> {
        let wait = self.timeouts.default_wait();

        info!("💾 正在保存测验...");
        self.navigator
            .wait_and_click(&anchors::save_button(), wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::share_button(), wait)
            .await?;

        let link = match self
            .navigator
            .wait_for_value(&anchors::share_link(), wait)
            .await
        {
            Ok(link) => link.trim().to_string(),
            Err(NavError::AnchorTimeout { .. }) => return Err(PublishError::ShareLinkMissing),
            Err(other) => return Err(other.into()),
        };
        if link.is_empty() {
            return Err(PublishError::ShareLinkMissing);
        }
        info!("🔗 分享链接: {}", link);

        self.navigator
            .wait_and_click(&anchors::share_close(), wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::finish_button(), wait)
            .await?;

        info!("✓ 测验已保存");
        Ok(link)
    }

    /// 释放会话；关闭出错只记录，不覆盖发布结果
    pub async fn teardown(session: SessionHandle) {
        let label = session.label().to_string();
        if session.teardown().await.is_ok() {
            info!("✓ 会话已释放 ({})", label);
        }
    }
}
