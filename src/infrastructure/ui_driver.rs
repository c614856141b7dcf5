//! UI 驱动接口 - 基础设施层
//!
//! 所有 DOM 交互的唯一入口。上层只认识 `Anchor`，不认识 CSS / XPath 之外的任何页面细节。

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::DriverResult;

/// 锚点定位方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

/// 页面上一个稳定、可唯一识别的交互点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// 稳定名称，用于日志和测试
    pub name: String,
    pub selector: Selector,
}

impl Anchor {
    pub fn css(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: Selector::Css(css.into()),
        }
    }

    pub fn xpath(name: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: Selector::XPath(xpath.into()),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 锚点当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    Absent,
    /// 存在于 DOM 中，但不可见或被禁用
    Present,
    /// 可见且可交互
    Interactable,
}

impl AnchorState {
    pub fn is_present(self) -> bool {
        !matches!(self, AnchorState::Absent)
    }
}

/// UI 驱动
///
/// 职责：
/// - 持有唯一的页面资源
/// - 只做单次、立即返回的交互，不做等待
/// - 元素在交互过程中失效时返回 `DriverError::Stale`
#[async_trait]
pub trait UiDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn reload(&self) -> DriverResult<()>;

    /// 查询锚点状态
    async fn probe(&self, anchor: &Anchor) -> DriverResult<AnchorState>;

    async fn click(&self, anchor: &Anchor) -> DriverResult<()>;

    /// 在锚点末尾追加文本
    async fn type_text(&self, anchor: &Anchor, text: &str) -> DriverResult<()>;

    /// 为文件上传控件设置本地文件
    async fn attach_file(&self, anchor: &Anchor, path: &Path) -> DriverResult<()>;

    /// 读取 `value` 属性
    async fn read_value(&self, anchor: &Anchor) -> DriverResult<Option<String>>;

    async fn read_text(&self, anchor: &Anchor) -> DriverResult<Option<String>>;

    /// 关闭浏览器会话
    async fn shutdown(&self) -> DriverResult<()>;
}
