//! 图片上传子流程（封面和题目图片共用）

use std::time::Duration;

use tracing::info;

use crate::error::PublishError;
use crate::infrastructure::{anchors, Anchor, Navigator};
use crate::services::ImageResolver;

/// 解析图片 → 设置到上传控件 → 等待页面确认图片已附加
///
/// 调用前上传对话框必须已经打开。临时图片在确认之后才释放。
pub async fn upload_image(
    navigator: &Navigator,
    resolver: &dyn ImageResolver,
    query: &str,
    attached: &Anchor,
    wait: Duration,
    upload_wait: Duration,
) -> Result<(), PublishError> {
    info!("🔎 正在查找图片: {}", query);
    let asset = resolver.resolve(query).await?;

    navigator
        .wait_and_attach(&anchors::upload_input(), asset.path(), wait)
        .await?;
    navigator.wait_for(attached, upload_wait).await?;

    info!("✓ 图片已上传 ({})", asset.source_url());
    drop(asset);
    Ok(())
}
