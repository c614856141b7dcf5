//! Chromium 驱动 - 基础设施层
//!
//! 持有唯一的 Page 资源，通过 CDP 实现 `UiDriver`

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{DriverError, DriverResult};
use crate::infrastructure::ui_driver::{Anchor, AnchorState, Selector, UiDriver};

/// 可见且未禁用
const INTERACTABLE_JS: &str = r#"
function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    const visible = rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
    return visible && !this.disabled && this.getAttribute('aria-disabled') !== 'true';
}
"#;

/// 聚焦并把光标移到末尾，使后续输入为追加
const FOCUS_END_JS: &str = r#"
function() {
    this.focus();
    if (typeof this.setSelectionRange === 'function' && typeof this.value === 'string') {
        const end = this.value.length;
        this.setSelectionRange(end, end);
    } else if (this.isContentEditable) {
        const range = document.createRange();
        range.selectNodeContents(this);
        range.collapse(false);
        const selection = window.getSelection();
        selection.removeAllRanges();
        selection.addRange(range);
    }
    return true;
}
"#;

/// Chromium 驱动
///
/// - `owns_browser` 为 true 时由本进程启动，关闭时关闭整个浏览器
/// - 否则是连接到已有浏览器，关闭时只关闭自己的页面
pub struct ChromeDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    owns_browser: bool,
}

impl ChromeDriver {
    pub fn new(browser: Browser, page: Page, handler_task: JoinHandle<()>, owns_browser: bool) -> Self {
        Self {
            browser: Mutex::new(browser),
            page,
            handler_task: Mutex::new(Some(handler_task)),
            owns_browser,
        }
    }

    /// 定位锚点；只有“不存在”映射为 `Missing`，连接类错误原样上报
    async fn locate(&self, anchor: &Anchor) -> DriverResult<Element> {
        let found = match &anchor.selector {
            Selector::Css(css) => self.page.find_element(css.as_str()).await,
            Selector::XPath(xpath) => self
                .page
                .find_xpaths(xpath.as_str())
                .await
                .and_then(|elements| elements.into_iter().next().ok_or(CdpError::NotFound)),
        };
        found.map_err(|e| {
            let err = classify_locate_error(e);
            debug!("定位锚点 {} 失败: {}", anchor, err);
            err
        })
    }

    /// 交互前重新定位；探测之后消失的元素视为已失效
    async fn locate_for_action(&self, anchor: &Anchor) -> DriverResult<Element> {
        match self.locate(anchor).await {
            Err(DriverError::Missing) => Err(DriverError::Stale),
            other => other,
        }
    }

    async fn eval_on(&self, element: &Element, js: &str) -> DriverResult<serde_json::Value> {
        let returns = element.call_js_fn(js, false).await?;
        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl UiDriver for ChromeDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn reload(&self) -> DriverResult<()> {
        self.page.reload().await?;
        Ok(())
    }

    async fn probe(&self, anchor: &Anchor) -> DriverResult<AnchorState> {
        let element = match self.locate(anchor).await {
            Ok(element) => element,
            Err(DriverError::Missing) => return Ok(AnchorState::Absent),
            Err(e) => return Err(e),
        };
        // 探测期间被重新渲染视为暂不存在，交给下一轮轮询
        match self.eval_on(&element, INTERACTABLE_JS).await {
            Ok(value) if value.as_bool() == Some(true) => Ok(AnchorState::Interactable),
            Ok(_) => Ok(AnchorState::Present),
            Err(DriverError::Stale) => Ok(AnchorState::Absent),
            Err(e) => Err(e),
        }
    }

    async fn click(&self, anchor: &Anchor) -> DriverResult<()> {
        let element = self.locate_for_action(anchor).await?;
        element.click().await?;
        Ok(())
    }

    async fn type_text(&self, anchor: &Anchor, text: &str) -> DriverResult<()> {
        let element = self.locate_for_action(anchor).await?;
        self.eval_on(&element, FOCUS_END_JS).await?;
        // 按键模拟只覆盖美式键盘，用 insertText 输入任意 Unicode 文本
        self.page.execute(insert_text_command(text)).await?;
        Ok(())
    }

    async fn attach_file(&self, anchor: &Anchor, path: &Path) -> DriverResult<()> {
        let element = self.locate_for_action(anchor).await?;
        let mut params = SetFileInputFilesParams::new(vec![path.to_string_lossy().into_owned()]);
        params.backend_node_id = Some(element.backend_node_id.clone());
        self.page.execute(params).await?;
        Ok(())
    }

    async fn read_value(&self, anchor: &Anchor) -> DriverResult<Option<String>> {
        let element = self.locate(anchor).await?;
        let value = element.property("value").await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn read_text(&self, anchor: &Anchor) -> DriverResult<Option<String>> {
        let element = self.locate(anchor).await?;
        Ok(element.inner_text().await?)
    }

    async fn shutdown(&self) -> DriverResult<()> {
        let result = if self.owns_browser {
            let mut browser = self.browser.lock().await;
            browser.close().await.map(|_| ())
        } else {
            self.page.clone().close().await
        };

        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }

        result.map_err(|e| {
            warn!("关闭浏览器失败: {}", e);
            DriverError::from(e)
        })
    }
}

fn insert_text_command(text: &str) -> InsertTextParams {
    InsertTextParams::new(text)
}

/// 查询不到节点时 Chromium 返回的错误信息
fn is_missing_node_message(message: &str) -> bool {
    const MARKERS: [&str; 4] = [
        "Could not find node with given id",
        "No node with given id found",
        "No search session with given id",
        "Invalid search result range",
    ];
    MARKERS.iter().any(|marker| message.contains(marker))
}

fn classify_locate_error(err: CdpError) -> DriverError {
    match err {
        CdpError::NotFound => DriverError::Missing,
        CdpError::Chrome(ref e) if is_missing_node_message(&e.message) => DriverError::Missing,
        CdpError::ChromeMessage(ref m) if is_missing_node_message(m) => DriverError::Missing,
        other => DriverError::Cdp(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromiumoxide::keys::get_key_definition;

    #[test]
    fn test_insert_text_keeps_non_ascii_text() {
        for text in ["Präteritum", "Wie heißt dieses Spielzeug?", "太阳系", "café"] {
            // 美式键盘布局里找不到这些字符
            assert!(text.chars().any(|c| get_key_definition(c.to_string()).is_none()));

            let command = insert_text_command(text);
            assert_eq!(command.text, text);
            assert_eq!(
                serde_json::to_value(&command).unwrap(),
                serde_json::json!({ "text": text })
            );
        }
    }

    #[test]
    fn test_missing_node_is_absent_but_connection_errors_propagate() {
        assert!(matches!(
            classify_locate_error(CdpError::NotFound),
            DriverError::Missing
        ));
        assert!(matches!(
            classify_locate_error(CdpError::msg("Could not find node with given id")),
            DriverError::Missing
        ));
        assert!(matches!(
            classify_locate_error(CdpError::NoResponse),
            DriverError::Cdp(_)
        ));
        assert!(matches!(
            classify_locate_error(CdpError::Timeout),
            DriverError::Cdp(_)
        ));
    }
}
