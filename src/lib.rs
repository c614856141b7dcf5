//! # Quiz Publisher
//!
//! 通过自动化浏览器把结构化测验文档发布到 Kahoot 创建页，并返回分享链接
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器会话，只暴露能力
//! - `UiDriver` - 单次 DOM 交互（`ChromeDriver` 为 chromiumoxide 实现）
//! - `Navigator` - 带时限的等待、点击、输入、上传，以及过期重试
//! - `SessionHandle` - 独占会话，释放只发生一次
//!
//! ### ② 业务能力层（Services）
//! - `SessionController` - 登录
//! - `MediaResolver` - 查询文字 → 本地 JPEG
//! - `ResultWriter` - 写发布结果文件
//!
//! ### ③ 流程层（Workflow）
//! - `QuizTranscriber` - 新建空白测验、填写设置、逐题录入
//! - `QuestionFlow` - 单题录入
//! - `PublicationFinalizer` - 保存、读取分享链接、释放会话
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/publisher` - 单个测验的一次发布运行
//! - `orchestrator/batch_processor` - 批量发布，每个测验一个新会话

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_session;
pub use config::Config;
pub use error::{FailureKind, PublicationFailure, PublishError, RemoteState};
pub use models::{Credentials, Question, QuestionKind, QuizDocument};
pub use orchestrator::{App, Publisher};
pub use workflow::{PublicationFinalizer, QuizTranscriber};
