//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量测验发布器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载测验文件
//! - 为每个测验启动新的浏览器会话
//! - 输出全局统计信息并写入结果文件
//!
//! ### `publisher` - 单个测验发布器
//! - 校验 → 登录 → 录入 → 收尾
//! - 无论成功失败都释放会话
//! - 失败时给出外部残留状态
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<QuizFile>)
//!     ↓
//! publisher (处理单个 QuizDocument)
//!     ↓
//! workflow (QuizTranscriber / QuestionFlow / PublicationFinalizer)
//!     ↓
//! services (SessionController / MediaResolver / ResultWriter)
//!     ↓
//! infrastructure (Navigator / UiDriver / SessionHandle)
//! ```

pub mod batch_processor;
pub mod publisher;

pub use batch_processor::App;
pub use publisher::Publisher;
