//! 题目处理上下文
//!
//! 封装"我正在录入哪份测验的第几题、用哪种模板"这一信息

use std::fmt::Display;

use crate::models::{QuestionKind, QuizDocument};

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 测验索引（仅用于日志显示）
    pub quiz_index: usize,

    /// 题目在测验中的位置（从1开始）
    pub position: usize,

    /// 题目总数
    pub total: usize,

    /// 实际使用的模板
    pub kind: QuestionKind,

    /// 下一题的模板，最后一题为 None
    pub next_kind: Option<QuestionKind>,
}

impl QuestionCtx {
    /// 为第 `index` 题（从 0 开始）构建上下文
    pub fn for_index(document: &QuizDocument, index: usize, quiz_index: usize) -> Option<Self> {
        Some(Self {
            quiz_index,
            position: index + 1,
            total: document.questions.len(),
            kind: document.effective_kind(index)?,
            next_kind: document.effective_kind(index + 1),
        })
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[测验 {} 题目 {}/{} {}]",
            self.quiz_index, self.position, self.total, self.kind
        )
    }
}
