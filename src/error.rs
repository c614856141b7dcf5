//! 错误类型
//!
//! 分层定义：
//! - `DriverError`：UI 驱动层（单次 DOM 交互）
//! - `NavError`：导航原语层（带超时的等待、过期重试）
//! - `MediaError`：图片解析
//! - `DocumentError`：测验文档校验
//! - `PublishError`：一次发布运行的最终错误
//!
//! 应用层（加载、配置、入口）统一使用 `anyhow`。

use std::time::Duration;

use thiserror::Error;

/// UI 驱动层错误
#[derive(Debug, Error)]
pub enum DriverError {
    /// 已定位的元素被并发重新渲染而失效
    #[error("元素引用已失效")]
    Stale,

    /// 锚点当前不存在
    #[error("元素不存在")]
    Missing,

    /// CDP 通信或协议错误
    #[error("CDP 错误: {0}")]
    Cdp(String),

    /// 本地文件相关错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        let message = err.to_string();
        if is_stale_message(&message) {
            DriverError::Stale
        } else {
            DriverError::Cdp(message)
        }
    }
}

/// Chromium 在节点被移除或替换后返回的错误信息
fn is_stale_message(message: &str) -> bool {
    const MARKERS: [&str; 5] = [
        "Could not find node with given id",
        "No node with given id found",
        "Node is detached from document",
        "Cannot find context with specified id",
        "Node does not have a layout object",
    ];
    MARKERS.iter().any(|marker| message.contains(marker))
}

/// 导航原语错误
#[derive(Debug, Error)]
pub enum NavError {
    /// 锚点在时限内未就绪
    #[error("等待锚点 `{anchor}` 超时 ({timeout:?})")]
    AnchorTimeout { anchor: String, timeout: Duration },

    /// 锚点在交互过程中失效
    #[error("锚点 `{anchor}` 已失效")]
    StaleAnchor { anchor: String },

    /// 过期重试次数耗尽，按超时类错误上报
    #[error("锚点 `{anchor}` 连续失效 {attempts} 次，放弃重试")]
    StaleRetriesExhausted { anchor: String, attempts: u32 },

    /// 其他驱动错误
    #[error("操作锚点 `{anchor}` 失败: {source}")]
    Driver {
        anchor: String,
        #[source]
        source: DriverError,
    },
}

impl NavError {
    /// 是否为可重试的过期错误
    pub fn is_stale(&self) -> bool {
        matches!(self, NavError::StaleAnchor { .. })
    }

    /// 是否属于超时类错误（含过期重试耗尽）
    pub fn is_timeout_class(&self) -> bool {
        matches!(
            self,
            NavError::AnchorTimeout { .. } | NavError::StaleRetriesExhausted { .. }
        )
    }

    pub(crate) fn from_driver(anchor: &str, err: DriverError) -> Self {
        match err {
            DriverError::Stale => NavError::StaleAnchor {
                anchor: anchor.to_string(),
            },
            other => NavError::Driver {
                anchor: anchor.to_string(),
                source: other,
            },
        }
    }
}

/// 图片解析错误
#[derive(Debug, Error)]
pub enum MediaError {
    /// 所有候选图片均失败
    #[error("没有可用的图片 (查询: `{query}`, 已尝试 {attempts} 个候选)")]
    NoImageAvailable { query: String, attempts: usize },

    /// 图片搜索 API 调用失败
    #[error("图片搜索失败 (查询: `{query}`): {reason}")]
    Search { query: String, reason: String },

    /// 单个候选下载失败
    #[error("下载图片失败 ({url}): {reason}")]
    Fetch { url: String, reason: String },

    /// 图片解码或编码失败
    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),

    /// 临时文件写入失败
    #[error("写入临时图片失败: {0}")]
    Store(#[from] std::io::Error),
}

/// 测验文档校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("测验没有任何题目")]
    NoQuestions,

    #[error("测验标题不能为空")]
    EmptyTitle,

    #[error("测验标题过长: {len} 个字符 (上限 {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("测验描述过长: {len} 个字符 (上限 {max})")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("第 {position} 题题干为空")]
    EmptyQuestionText { position: usize },

    #[error("第 {position} 题 ({kind}) 应有 {expected} 个选项，实际 {found} 个")]
    ChoiceCount {
        position: usize,
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("第 {position} 题正确答案索引 {index} 超出范围 [0, {max}]")]
    CorrectIndexOutOfRange {
        position: usize,
        index: usize,
        max: usize,
    },
}

/// 失败分类，用于向操作者展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CredentialRejected,
    AnchorTimeout,
    StaleAnchor,
    NoImageAvailable,
    InvalidDocument,
    ShareLinkMissing,
    Unclassified,
}

/// 一次发布运行的错误
#[derive(Debug, Error)]
pub enum PublishError {
    /// 登录被明确拒绝
    #[error("登录被拒绝: {reason}")]
    CredentialRejected { reason: String },

    #[error(transparent)]
    Navigation(#[from] NavError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("测验文档无效: {0}")]
    InvalidDocument(#[from] DocumentError),

    /// 分享链接控件没有给出链接
    #[error("未读取到分享链接")]
    ShareLinkMissing,

    /// 运行边界处捕获的其他错误，保留原始原因
    #[error("发布过程中发生未分类错误: {0:#}")]
    Unclassified(anyhow::Error),
}

impl PublishError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PublishError::CredentialRejected { .. } => FailureKind::CredentialRejected,
            PublishError::Navigation(NavError::AnchorTimeout { .. })
            | PublishError::Navigation(NavError::StaleRetriesExhausted { .. }) => {
                FailureKind::AnchorTimeout
            }
            PublishError::Navigation(NavError::StaleAnchor { .. }) => FailureKind::StaleAnchor,
            PublishError::Navigation(NavError::Driver { .. }) => FailureKind::Unclassified,
            PublishError::Media(MediaError::NoImageAvailable { .. }) => {
                FailureKind::NoImageAvailable
            }
            PublishError::Media(_) => FailureKind::Unclassified,
            PublishError::InvalidDocument(_) => FailureKind::InvalidDocument,
            PublishError::ShareLinkMissing => FailureKind::ShareLinkMissing,
            PublishError::Unclassified(_) => FailureKind::Unclassified,
        }
    }
}

/// 外部系统上的残留状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    /// 外部系统上没有创建任何测验
    Untouched,
    /// 外部系统上可能残留一个未完成的测验草稿
    PartialDraft { questions_entered: usize },
}

/// 发布失败：错误 + 外部残留状态
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PublicationFailure {
    #[source]
    pub error: PublishError,
    pub remote_state: RemoteState,
}

impl PublicationFailure {
    pub fn new(error: PublishError, remote_state: RemoteState) -> Self {
        Self {
            error,
            remote_state,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }

    pub fn left_partial_draft(&self) -> bool {
        matches!(self.remote_state, RemoteState::PartialDraft { .. })
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
pub type NavResult<T> = Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_driver_error_maps_to_stale_anchor() {
        let err = NavError::from_driver("question.title", DriverError::Stale);
        assert!(err.is_stale());
        assert!(!err.is_timeout_class());
    }

    #[test]
    fn test_cdp_error_maps_to_driver_variant() {
        let err = NavError::from_driver("login.submit", DriverError::Cdp("boom".into()));
        assert!(matches!(err, NavError::Driver { .. }));
        assert_eq!(
            PublishError::from(err).kind(),
            FailureKind::Unclassified
        );
    }

    #[test]
    fn test_exhausted_retries_are_timeout_class() {
        let err = NavError::StaleRetriesExhausted {
            anchor: "template.quiz".into(),
            attempts: 3,
        };
        assert!(err.is_timeout_class());
        assert_eq!(PublishError::from(err).kind(), FailureKind::AnchorTimeout);
    }

    #[test]
    fn test_stale_message_detection() {
        assert!(is_stale_message(
            "Error -32000: Node is detached from document"
        ));
        assert!(!is_stale_message("net::ERR_CONNECTION_REFUSED"));
    }

    #[test]
    fn test_partial_draft_flag() {
        let failure = PublicationFailure::new(
            PublishError::ShareLinkMissing,
            RemoteState::PartialDraft {
                questions_entered: 2,
            },
        );
        assert!(failure.left_partial_draft());
        assert_eq!(failure.kind(), FailureKind::ShareLinkMissing);
    }
}
