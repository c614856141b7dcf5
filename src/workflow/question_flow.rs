//! 题目录入流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整录入流程
//!
//! 流程顺序：
//! 1. 题干
//! 2. 题目图片（可选）
//! 3. 选项（仅单选题）
//! 4. 标记正确答案
//! 5. 不是最后一题时：新建题目块并选择下一题的模板

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Timeouts;
use crate::error::PublishError;
use crate::infrastructure::{anchors, Navigator};
use crate::models::{Question, QuestionKind};
use crate::services::ImageResolver;
use crate::utils::logging::truncate_text;
use crate::workflow::media_step::upload_image;
use crate::workflow::question_ctx::QuestionCtx;

/// 单题录入进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStep {
    Text,
    Image,
    Choices,
    CorrectAnswer,
    NextBlock,
}

/// 题目录入流程
///
/// - 只处理单个题目
/// - 不持有页面资源，只依赖导航原语和图片解析
pub struct QuestionFlow {
    navigator: Navigator,
    resolver: Arc<dyn ImageResolver>,
    timeouts: Timeouts,
}

impl QuestionFlow {
    pub fn new(navigator: Navigator, resolver: Arc<dyn ImageResolver>, timeouts: Timeouts) -> Self {
        Self {
            navigator,
            resolver,
            timeouts,
        }
    }

    /// 录入当前题目块（步骤 1-4）
    pub async fn enter(&self, question: &Question, ctx: &QuestionCtx) -> Result<(), PublishError> {
        let wait = self.timeouts.default_wait();
        info!("{} 题干: {}", ctx, truncate_text(&question.text, 80));

        self.log_step(ctx, QuestionStep::Text);
        let title = anchors::question_title();
        self.navigator.wait_and_click(&title, wait).await?;
        self.navigator.wait_and_type(&title, &question.text, wait).await?;

        if let Some(query) = &question.image_query {
            self.log_step(ctx, QuestionStep::Image);
            self.navigator
                .wait_and_click(&anchors::question_image_picker(), wait)
                .await?;
            upload_image(
                &self.navigator,
                self.resolver.as_ref(),
                query,
                &anchors::question_image_attached(),
                wait,
                self.timeouts.upload(),
            )
            .await?;
        }

        // 判断题的两个选项是模板自带的
        if ctx.kind == QuestionKind::MultipleChoice {
            self.log_step(ctx, QuestionStep::Choices);
            for (index, choice) in question.choices.iter().enumerate() {
                let anchor = anchors::choice(index);
                self.navigator.wait_and_click(&anchor, wait).await?;
                self.navigator.wait_and_type(&anchor, choice, wait).await?;
            }
        }

        self.log_step(ctx, QuestionStep::CorrectAnswer);
        self.navigator
            .wait_and_click(&anchors::correct_toggle(question.correct_index), wait)
            .await?;

        Ok(())
    }

    /// 新建题目块并选择 `next_kind` 对应的模板（步骤 5）
    ///
    /// 模板选择器刚渲染完成时容易失效，点击使用过期重试。
    pub async fn add_block(&self, next_kind: QuestionKind, ctx: &QuestionCtx) -> Result<(), PublishError> {
        self.log_step(ctx, QuestionStep::NextBlock);
        self.navigator
            .wait_and_click(&anchors::add_question(), self.timeouts.default_wait())
            .await?;
        self.navigator
            .wait_for(&anchors::template_chooser(), self.timeouts.template_chooser())
            .await?;
        self.navigator
            .wait_and_click_retrying(&anchors::template(next_kind), self.timeouts.default_wait())
            .await?;

        info!("{} ➕ 已新建下一题 ({})", ctx, next_kind);
        Ok(())
    }

    fn log_step(&self, ctx: &QuestionCtx, step: QuestionStep) {
        debug!("{} 步骤: {:?}", ctx, step);
    }
}
