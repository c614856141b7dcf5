//! 流程层（Workflow）
//!
//! - `quiz_transcriber`：整份测验的录入顺序
//! - `question_flow`：单题录入
//! - `media_step`：封面和题目图片共用的上传子流程
//! - `finalizer`：保存、读取分享链接、释放会话

pub mod finalizer;
pub mod media_step;
pub mod question_ctx;
pub mod question_flow;
pub mod quiz_transcriber;

pub use finalizer::PublicationFinalizer;
pub use media_step::upload_image;
pub use question_ctx::QuestionCtx;
pub use question_flow::{QuestionFlow, QuestionStep};
pub use quiz_transcriber::{QuizTranscriber, TranscriptionProgress, TranscriptionStage};
